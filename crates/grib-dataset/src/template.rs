//! Dataset template: canonical coordinates and variable shapes.
//!
//! A template is built once from a representative scan and fixes the
//! structure of every dataset opened against it: the shared grid geometry,
//! deduplicated forecast-time and vertical-level axes, and one spec per
//! logical variable. Axis identity comes from content, not discovery order,
//! so rebuilding from the same messages always yields the same names.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};

use grib_common::{
    period_label, period_seconds, select_vert_levels, standard_vert_levels, AnyOf, MessageHeader,
    Predicate, VertLevel,
};

use crate::attrs::{DatasetAttrs, VarAttrs};
use crate::error::{DatasetError, Result};
use crate::geometry::{GeometryProvider, Grid};

/// Fields every message of one dataset build must agree on.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonInfo {
    pub reftime: DateTime<Utc>,
    pub centre: String,
    pub subcentre: String,
    pub gdtnum: i32,
    pub gdtmpl: Vec<i32>,
}

impl CommonInfo {
    fn from_header(header: &MessageHeader) -> Result<Self> {
        // Only regular grids are allowed.
        if header.npts != header.nx * header.ny {
            return Err(DatasetError::ThinnedGrid {
                npts: header.npts,
                nx: header.nx,
                ny: header.ny,
            });
        }
        Ok(Self {
            reftime: header.reftime,
            centre: header.centre.clone(),
            subcentre: header.subcentre.clone(),
            gdtnum: header.gdtnum,
            gdtmpl: header.gdtmpl.clone(),
        })
    }

    /// Enforce the single-reference-time, single-geometry invariant.
    fn check(&self, header: &MessageHeader) -> Result<()> {
        if header.reftime != self.reftime {
            return Err(DatasetError::ReferenceTimeMismatch {
                expected: self.reftime,
                found: header.reftime,
            });
        }
        if header.gdtnum != self.gdtnum || header.gdtmpl != self.gdtmpl {
            return Err(DatasetError::ProjectionMismatch {
                expected: format!("{}: {:?}", self.gdtnum, self.gdtmpl),
                found: format!("{}: {:?}", header.gdtnum, header.gdtmpl),
            });
        }
        Ok(())
    }
}

/// Values of one coordinate variable.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordValues {
    /// Level magnitudes, grid coordinates, markers.
    Float(Vec<f64>),
    /// Forecast periods as whole seconds.
    Seconds(Vec<i64>),
}

impl CoordValues {
    pub fn len(&self) -> usize {
        match self {
            CoordValues::Float(v) => v.len(),
            CoordValues::Seconds(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One coordinate variable: empty `dims` means a scalar coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub dims: Vec<String>,
    pub values: CoordValues,
    pub attrs: VarAttrs,
}

impl Coordinate {
    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }
}

/// Structure of one logical variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VarSpec {
    /// Name of the forecast-time coordinate (dimension or scalar).
    pub time_coord: String,
    /// Name of the vertical-level coordinate, for 3-D variables.
    pub level_coord: Option<String>,
    /// Dimension names: time?, level?, then the grid dimensions.
    pub dims: Vec<String>,
    /// Shape matching `dims`.
    pub shape: Vec<usize>,
    pub attrs: VarAttrs,
}

impl VarSpec {
    /// True when the variable has a forecast-time dimension (as opposed to a
    /// scalar time coordinate).
    pub fn has_time_dim(&self) -> bool {
        self.dims.first() == Some(&self.time_coord)
    }
}

/// Configuration for a template scan.
#[derive(Default)]
pub struct TemplateConfig {
    vert_levels: Vec<String>,
    reftime: Option<DateTime<Utc>>,
    predicates: Vec<Box<dyn Predicate>>,
}

impl TemplateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat these level types as vertical dimensions (labels from the
    /// standard table, e.g. "isobaric"). With a non-empty selection,
    /// messages on unselected vertical level types are excluded from the
    /// template instead of becoming per-level 2-D variables.
    pub fn with_vert_levels(mut self, labels: &[&str]) -> Self {
        self.vert_levels = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    /// Restrict the scan to messages with this reference time. Required when
    /// the scanned files mix model runs.
    pub fn with_reftime(mut self, reftime: DateTime<Utc>) -> Self {
        self.reftime = Some(reftime);
        self
    }

    /// Add a selection predicate. A message is considered when at least one
    /// predicate matches; no predicates means everything matches.
    pub fn with_predicate<P: Predicate + 'static>(mut self, predicate: P) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }
}

/// Per-variable accumulation during the scan.
struct VarInfo {
    long_name: String,
    units: String,
    periods: BTreeSet<Duration>,
    level: Option<VertLevel>,
    level_values: Vec<f64>,
}

/// Immutable dataset structure definition.
///
/// Built once per logical dataset, then reused across many index builds,
/// including builds over message sets the canonicalization scan never saw.
#[derive(Debug)]
pub struct Template {
    common: CommonInfo,
    grid: Grid,
    coords: BTreeMap<String, Coordinate>,
    var_specs: BTreeMap<String, VarSpec>,
    vert_levels: BTreeMap<u16, VertLevel>,
    closed_level_codes: BTreeSet<u16>,
    predicates: AnyOf,
}

impl Template {
    /// Canonicalize a set of header records into a template.
    ///
    /// Returns `Ok(None)` when nothing matched the configuration. A header
    /// whose reference time or grid definition disagrees with the first
    /// matching header is a hard error: one template describes one model
    /// run on one geometry.
    pub fn scan(
        headers: &[MessageHeader],
        config: TemplateConfig,
        provider: &dyn GeometryProvider,
    ) -> Result<Option<Template>> {
        let vert_levels = select_vert_levels(&config.vert_levels)?;
        let closed_level_codes: BTreeSet<u16> = standard_vert_levels().into_keys().collect();
        let predicates = AnyOf::new(config.predicates);

        let mut common: Option<CommonInfo> = None;
        let mut infos: BTreeMap<String, VarInfo> = BTreeMap::new();

        for header in headers {
            if !predicates.matches(header) {
                continue;
            }
            if let Some(reftime) = config.reftime {
                if header.reftime != reftime {
                    continue;
                }
            }
            if !level_accepted(header.bot_level_code, &vert_levels, &closed_level_codes) {
                continue;
            }
            match &common {
                Some(info) => info.check(header)?,
                None => common = Some(CommonInfo::from_header(header)?),
            }

            let name = variable_name(header, &vert_levels);
            let level = vert_levels.get(&header.bot_level_code).cloned();
            let info = infos.entry(name).or_insert_with(|| VarInfo {
                long_name: header.long_name.clone(),
                units: header.units.clone(),
                periods: BTreeSet::new(),
                level,
                level_values: Vec::new(),
            });
            info.periods.insert(header.forecast_period());
            if info.level.is_some() {
                info.level_values.push(header.bot_level_value);
            }
        }

        let common = match common {
            Some(c) => c,
            None => return Ok(None),
        };
        let grid = provider.resolve(common.gdtnum, &common.gdtmpl)?;

        let mut coords: BTreeMap<String, Coordinate> = grid
            .coords()
            .iter()
            .map(|(name, gc)| {
                (
                    name.clone(),
                    Coordinate {
                        dims: gc.dims.clone(),
                        values: CoordValues::Float(gc.values.clone()),
                        attrs: gc.attrs.clone(),
                    },
                )
            })
            .collect();

        let (level_dims, level_coords, level_var2coord) = build_level_axes(&infos);
        coords.extend(level_coords);
        let (time_dims, time_coords, time_var2coord) = build_time_axes(&infos);
        coords.extend(time_coords);

        let var_specs = build_var_specs(
            &infos,
            &grid,
            &time_dims,
            &time_var2coord,
            &level_dims,
            &level_var2coord,
        );

        Ok(Some(Template {
            common,
            grid,
            coords,
            var_specs,
            vert_levels,
            closed_level_codes,
            predicates,
        }))
    }

    /// True when a header belongs to this template: at least one user
    /// predicate matches (none means all), the grid definition is the
    /// template's, and the level type is accepted.
    pub fn matches(&self, header: &MessageHeader) -> bool {
        self.predicates.matches(header)
            && self
                .grid
                .same_definition(header.gdtnum, &header.gdtmpl)
            && level_accepted(
                header.bot_level_code,
                &self.vert_levels,
                &self.closed_level_codes,
            )
    }

    /// Logical variable name for a header under this template's level table.
    pub fn variable_name(&self, header: &MessageHeader) -> String {
        variable_name(header, &self.vert_levels)
    }

    pub fn common(&self) -> &CommonInfo {
        &self.common
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Canonical coordinate variables (grid, level and time axes).
    pub fn coords(&self) -> &BTreeMap<String, Coordinate> {
        &self.coords
    }

    pub fn coord(&self, name: &str) -> Option<&Coordinate> {
        self.coords.get(name)
    }

    pub fn var_specs(&self) -> &BTreeMap<String, VarSpec> {
        &self.var_specs
    }

    pub fn var_names(&self) -> Vec<&str> {
        self.var_specs.keys().map(String::as_str).collect()
    }

    /// Top-level attributes for datasets built from this template. The
    /// `coordinates` list is filled in by the assembler.
    pub fn dataset_attrs(&self) -> DatasetAttrs {
        DatasetAttrs {
            projection: self.grid.cfname().to_string(),
            centre: self.common.centre.clone(),
            subcentre: self.common.subcentre.clone(),
            history: format!(
                "Created by {}-{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ),
            coordinates: String::new(),
        }
    }
}

/// Whether a level type takes part in this template.
///
/// Codes outside the closed vertical table always pass. With a non-empty
/// selection, closed-table codes pass only when selected; an empty selection
/// accepts everything and no variable gets a vertical dimension.
fn level_accepted(
    code: u16,
    selected: &BTreeMap<u16, VertLevel>,
    closed: &BTreeSet<u16>,
) -> bool {
    selected.is_empty() || !closed.contains(&code) || selected.contains_key(&code)
}

/// Logical variable name: base, level qualifier, period qualifier, joined
/// with "." and with spaces flattened to underscores.
pub fn variable_name(header: &MessageHeader, vert_levels: &BTreeMap<u16, VertLevel>) -> String {
    let level = match vert_levels.get(&header.bot_level_code) {
        Some(v) => v.label.to_string(),
        None => header.level_str.clone(),
    };
    let mut parts = vec![header.varname.clone()];
    if !level.is_empty() {
        parts.push(level);
    }
    if let Some(period) = period_label(&header.time_str, header.interval()) {
        parts.push(period);
    }
    parts.join(".").replace(' ', "_")
}

fn level_content_hash(label: &str, values: &[f64]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(label.as_bytes());
    for v in values {
        hasher.update(&v.to_bits().to_le_bytes());
    }
    hasher.finalize()
}

fn period_content_hash(seconds: &[i64]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    for s in seconds {
        hasher.update(&s.to_le_bytes());
    }
    hasher.finalize()
}

type AxisParts = (
    BTreeMap<String, usize>,
    BTreeMap<String, Coordinate>,
    BTreeMap<String, String>,
);

/// Deduplicate vertical axes across variables and name them by content.
///
/// Variables sharing (level type, value set) share one axis. Names are
/// `<label><n>` with n assigned by ascending content hash, so discovery
/// order does not leak into the result.
fn build_level_axes(infos: &BTreeMap<String, VarInfo>) -> AxisParts {
    struct VarAxis {
        level: VertLevel,
        hash: u32,
        values: Vec<f64>,
    }

    let mut per_var: BTreeMap<&str, VarAxis> = BTreeMap::new();
    for (name, info) in infos {
        let level = match &info.level {
            Some(level) => level.clone(),
            None => continue,
        };
        let mut values = info.level_values.clone();
        values.sort_by(f64::total_cmp);
        values.dedup();
        if level.reverse {
            values.reverse();
        }
        let hash = level_content_hash(level.label, &values);
        per_var.insert(name.as_str(), VarAxis { level, hash, values });
    }

    // Rank distinct value sets per label by hash to fix axis numbering.
    let mut hashes_per_label: BTreeMap<&str, BTreeSet<u32>> = BTreeMap::new();
    for axis in per_var.values() {
        hashes_per_label
            .entry(axis.level.label)
            .or_default()
            .insert(axis.hash);
    }
    let axis_name = |axis: &VarAxis| -> String {
        let rank = hashes_per_label[axis.level.label]
            .iter()
            .position(|h| *h == axis.hash)
            .unwrap_or(0);
        format!("{}{}", axis.level.label, rank + 1)
    };

    let mut dims = BTreeMap::new();
    let mut coords = BTreeMap::new();
    let mut var2coord = BTreeMap::new();
    for (var, axis) in &per_var {
        let name = axis_name(axis);
        var2coord.insert(var.to_string(), name.clone());
        dims.insert(name.clone(), axis.values.len());
        coords.entry(name.clone()).or_insert_with(|| Coordinate {
            dims: vec![name.clone()],
            values: CoordValues::Float(axis.values.clone()),
            attrs: VarAttrs {
                units: Some(axis.level.units.to_string()),
                axis: Some("Z".to_string()),
                positive: Some(axis.level.positive().to_string()),
                ..Default::default()
            },
        });
    }
    (dims, coords, var2coord)
}

/// Deduplicate forecast-time axes, named `time<n>` by content hash.
///
/// When every time axis in the build has a single value, time collapses to
/// scalar coordinates and no variable gets a time dimension.
fn build_time_axes(infos: &BTreeMap<String, VarInfo>) -> AxisParts {
    struct VarAxis {
        hash: u32,
        seconds: Vec<i64>,
    }

    let mut per_var: BTreeMap<&str, VarAxis> = BTreeMap::new();
    for (name, info) in infos {
        let seconds: Vec<i64> = info.periods.iter().map(|p| period_seconds(*p)).collect();
        let hash = period_content_hash(&seconds);
        per_var.insert(name.as_str(), VarAxis { hash, seconds });
    }

    let hashes: BTreeSet<u32> = per_var.values().map(|a| a.hash).collect();
    let axis_name = |axis: &VarAxis| -> String {
        let rank = hashes.iter().position(|h| *h == axis.hash).unwrap_or(0);
        format!("time{}", rank + 1)
    };

    // Squeeze only when all time axes have length one.
    let squeeze = per_var.values().map(|a| a.seconds.len()).max() == Some(1);

    let mut dims = BTreeMap::new();
    let mut coords = BTreeMap::new();
    let mut var2coord = BTreeMap::new();
    let attrs = VarAttrs {
        standard_name: Some("forecast_period".to_string()),
        units: Some("seconds".to_string()),
        ..Default::default()
    };
    for (var, axis) in &per_var {
        let name = axis_name(axis);
        var2coord.insert(var.to_string(), name.clone());
        if !squeeze {
            dims.insert(name.clone(), axis.seconds.len());
        }
        coords.entry(name.clone()).or_insert_with(|| Coordinate {
            dims: if squeeze { Vec::new() } else { vec![name.clone()] },
            values: CoordValues::Seconds(axis.seconds.clone()),
            attrs: attrs.clone(),
        });
    }
    (dims, coords, var2coord)
}

fn build_var_specs(
    infos: &BTreeMap<String, VarInfo>,
    grid: &Grid,
    time_dims: &BTreeMap<String, usize>,
    time_var2coord: &BTreeMap<String, String>,
    level_dims: &BTreeMap<String, usize>,
    level_var2coord: &BTreeMap<String, String>,
) -> BTreeMap<String, VarSpec> {
    let mut specs = BTreeMap::new();
    for (name, info) in infos {
        let time_coord = time_var2coord[name].clone();
        let mut dims = Vec::new();
        let mut shape = Vec::new();
        if let Some(len) = time_dims.get(&time_coord) {
            dims.push(time_coord.clone());
            shape.push(*len);
        }
        let level_coord = level_var2coord.get(name).cloned();
        if let Some(level_name) = &level_coord {
            dims.push(level_name.clone());
            shape.push(level_dims[level_name]);
        }
        dims.extend(grid.dims().iter().cloned());
        shape.extend(grid.shape().iter().copied());

        let attrs = VarAttrs {
            short_name: name.split('.').next().map(str::to_string),
            long_name: Some(info.long_name.clone()),
            units: Some(info.units.clone()),
            grid_mapping: Some(grid.cfname().to_string()),
            ..Default::default()
        };
        specs.insert(
            name.clone(),
            VarSpec {
                time_coord,
                level_coord,
                dims,
                shape,
                attrs,
            },
        );
    }
    specs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::{test_header, TestGeometry};
    use chrono::TimeZone;

    fn scan(headers: &[MessageHeader], config: TemplateConfig) -> Option<Template> {
        Template::scan(headers, config, &TestGeometry).unwrap()
    }

    fn isobaric_config() -> TemplateConfig {
        TemplateConfig::new().with_vert_levels(&["isobaric"])
    }

    #[test]
    fn test_empty_scan_yields_none() {
        assert!(scan(&[], TemplateConfig::new()).is_none());
    }

    #[test]
    fn test_level_axis_is_shared_and_sorted_descending() {
        let headers = vec![
            test_header("TMP", 100, 70000.0, 3, "a.grib2", 0),
            test_header("TMP", 100, 100000.0, 3, "a.grib2", 100),
            test_header("TMP", 100, 85000.0, 3, "a.grib2", 200),
            test_header("RH", 100, 85000.0, 3, "a.grib2", 300),
            test_header("RH", 100, 70000.0, 3, "a.grib2", 400),
            test_header("RH", 100, 100000.0, 3, "a.grib2", 500),
        ];
        let template = scan(&headers, isobaric_config()).unwrap();

        let tmp = &template.var_specs()["TMP.isobaric"];
        let rh = &template.var_specs()["RH.isobaric"];
        assert_eq!(tmp.level_coord, rh.level_coord);

        let axis = template.coord(tmp.level_coord.as_deref().unwrap()).unwrap();
        assert_eq!(axis.dims, vec!["isobaric1".to_string()]);
        // Greatest pressure first, nearest the ground.
        assert_eq!(
            axis.values,
            CoordValues::Float(vec![100000.0, 85000.0, 70000.0])
        );
    }

    #[test]
    fn test_axis_names_independent_of_discovery_order() {
        let forward = vec![
            test_header("TMP", 100, 100000.0, 3, "a.grib2", 0),
            test_header("TMP", 100, 85000.0, 3, "a.grib2", 100),
            test_header("UGRD", 100, 100000.0, 3, "a.grib2", 200),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = scan(&forward, isobaric_config()).unwrap();
        let b = scan(&reversed, isobaric_config()).unwrap();

        assert_eq!(a.var_specs(), b.var_specs());
        let coords_a: Vec<_> = a.coords().keys().collect();
        let coords_b: Vec<_> = b.coords().keys().collect();
        assert_eq!(coords_a, coords_b);
    }

    #[test]
    fn test_distinct_level_sets_get_distinct_axes() {
        let headers = vec![
            test_header("TMP", 100, 100000.0, 3, "a.grib2", 0),
            test_header("TMP", 100, 85000.0, 3, "a.grib2", 100),
            test_header("UGRD", 100, 100000.0, 3, "a.grib2", 200),
            test_header("UGRD", 100, 25000.0, 3, "a.grib2", 300),
        ];
        let template = scan(&headers, isobaric_config()).unwrap();

        let tmp = &template.var_specs()["TMP.isobaric"];
        let ugrd = &template.var_specs()["UGRD.isobaric"];
        assert_ne!(tmp.level_coord, ugrd.level_coord);

        let mut names: Vec<_> = [&tmp.level_coord, &ugrd.level_coord]
            .iter()
            .map(|c| c.as_deref().unwrap().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["isobaric1", "isobaric2"]);
    }

    #[test]
    fn test_time_squeezes_to_scalar_when_all_axes_are_length_one() {
        let headers = vec![
            test_header("TMP", 1, 0.0, 6, "a.grib2", 0),
            test_header("UGRD", 1, 0.0, 6, "a.grib2", 100),
        ];
        let template = scan(&headers, TemplateConfig::new()).unwrap();

        for spec in template.var_specs().values() {
            assert!(!spec.has_time_dim());
            assert_eq!(spec.dims, vec!["y", "x"]);
            let coord = template.coord(&spec.time_coord).unwrap();
            assert!(coord.is_scalar());
            assert_eq!(coord.values, CoordValues::Seconds(vec![6 * 3600]));
        }
    }

    #[test]
    fn test_time_dimension_when_periods_differ() {
        let headers = vec![
            test_header("TMP", 1, 0.0, 3, "a.grib2", 0),
            test_header("TMP", 1, 0.0, 6, "a.grib2", 100),
        ];
        let template = scan(&headers, TemplateConfig::new()).unwrap();

        let spec = template.var_specs().values().next().unwrap();
        assert!(spec.has_time_dim());
        assert_eq!(spec.time_coord, "time1");
        assert_eq!(spec.shape[0], 2);
    }

    #[test]
    fn test_projection_mismatch_is_a_hard_error() {
        let mut odd = test_header("TMP", 1, 0.0, 3, "a.grib2", 100);
        odd.gdtmpl[7] = 12;
        odd.npts = 24;
        odd.nx = 12;
        let headers = vec![test_header("TMP", 1, 0.0, 3, "a.grib2", 0), odd];

        let err = Template::scan(&headers, TemplateConfig::new(), &TestGeometry).unwrap_err();
        match err {
            DatasetError::ProjectionMismatch { expected, found } => {
                assert!(expected != found);
                assert!(expected.starts_with("0:"));
            }
            other => panic!("expected projection mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_reference_time_mismatch_is_a_hard_error() {
        let mut late = test_header("TMP", 1, 0.0, 3, "a.grib2", 100);
        late.reftime = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        late.end_ft = late.reftime + Duration::hours(3);
        late.start_ft = late.end_ft;
        let headers = vec![test_header("TMP", 1, 0.0, 3, "a.grib2", 0), late];

        let err = Template::scan(&headers, TemplateConfig::new(), &TestGeometry).unwrap_err();
        assert!(matches!(err, DatasetError::ReferenceTimeMismatch { .. }));
    }

    #[test]
    fn test_reftime_filter_excludes_other_runs() {
        let reftime = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut late = test_header("UGRD", 1, 0.0, 3, "a.grib2", 100);
        late.reftime = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let headers = vec![test_header("TMP", 1, 0.0, 3, "a.grib2", 0), late];

        let template = scan(&headers, TemplateConfig::new().with_reftime(reftime)).unwrap();
        assert_eq!(template.var_names().len(), 1);
    }

    #[test]
    fn test_unselected_vertical_type_is_excluded() {
        let headers = vec![
            test_header("TMP", 100, 85000.0, 3, "a.grib2", 0),
            // Height above ground is in the closed vertical table but not
            // selected, so it drops out instead of becoming a 2-D variable.
            test_header("TMP", 103, 2.0, 3, "a.grib2", 100),
            // Surface is outside the closed table and always passes.
            test_header("PRES", 1, 0.0, 3, "a.grib2", 200),
        ];
        let template = scan(&headers, isobaric_config()).unwrap();

        assert_eq!(template.var_names(), vec!["PRES.surface", "TMP.isobaric"]);
    }

    #[test]
    fn test_variable_name_qualifiers() {
        let vert = select_vert_levels(&["isobaric".to_string()]).unwrap();

        let mut h = test_header("TMP", 100, 85000.0, 6, "a.grib2", 0);
        assert_eq!(variable_name(&h, &vert), "TMP.isobaric");

        h = test_header("TMP", 103, 2.0, 6, "a.grib2", 0);
        h.level_str = "2 m above ground".to_string();
        assert_eq!(variable_name(&h, &vert), "TMP.2_m_above_ground");

        h = test_header("APCP", 1, 0.0, 6, "a.grib2", 0);
        h.level_str = "surface".to_string();
        h.time_str = "0-6 hour acc fcst".to_string();
        h.start_ft = h.reftime;
        assert_eq!(variable_name(&h, &vert), "APCP.surface.6_hour_acc");
    }

    #[test]
    fn test_predicates_limit_the_scan() {
        let headers = vec![
            test_header("TMP", 1, 0.0, 3, "a.grib2", 0),
            test_header("UGRD", 1, 0.0, 3, "a.grib2", 100),
        ];
        let config =
            TemplateConfig::new().with_predicate(|h: &MessageHeader| h.varname == "TMP");
        let template = scan(&headers, config).unwrap();
        assert_eq!(template.var_names(), vec!["TMP.surface"]);
    }

    #[test]
    fn test_deterministic_rebuild() {
        let headers = vec![
            test_header("TMP", 100, 100000.0, 3, "a.grib2", 0),
            test_header("TMP", 100, 85000.0, 6, "a.grib2", 100),
            test_header("APCP", 1, 0.0, 6, "a.grib2", 200),
        ];
        let a = scan(&headers, isobaric_config()).unwrap();
        let b = scan(&headers, isobaric_config()).unwrap();

        assert_eq!(a.var_specs(), b.var_specs());
        assert_eq!(a.coords(), b.coords());
    }
}
