//! Grid geometry surface.
//!
//! A [`Grid`] fixes the spatial dimension names, shape and coordinate arrays
//! shared by every variable of one dataset. Geometry resolution, turning a
//! grid-definition template into those arrays, belongs to a
//! [`GeometryProvider`]; projection math stays outside this workspace. Only
//! the trivial regular latitude-longitude template is resolved in-crate.

use std::collections::BTreeMap;

use crate::attrs::VarAttrs;
use crate::error::{DatasetError, Result};

/// One coordinate variable owned by the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCoord {
    /// Dimension names; one entry for 1-D coordinates.
    pub dims: Vec<String>,
    /// Coordinate values, flattened row-major for 2-D coordinates.
    pub values: Vec<f64>,
    pub attrs: VarAttrs,
}

/// The shared spatial geometry of one dataset.
///
/// Holds everything the canonicalizer and assembler need: dimension names,
/// shape, coordinate variables, the CF mapping name, and the raw definition
/// retained for equality tests against incoming headers.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cfname: String,
    gdtnum: i32,
    gdtmpl: Vec<i32>,
    dims: Vec<String>,
    shape: Vec<usize>,
    coords: BTreeMap<String, GridCoord>,
    crs: VarAttrs,
}

impl Grid {
    /// Assemble a grid from resolved parts.
    pub fn new(
        cfname: impl Into<String>,
        gdtnum: i32,
        gdtmpl: Vec<i32>,
        dims: Vec<String>,
        shape: Vec<usize>,
        coords: BTreeMap<String, GridCoord>,
    ) -> Self {
        let cfname = cfname.into();
        let crs = VarAttrs {
            grid_mapping_name: Some(cfname.clone()),
            ..Default::default()
        };
        Self {
            cfname,
            gdtnum,
            gdtmpl,
            dims,
            shape,
            coords,
            crs,
        }
    }

    /// An unstructured point set: one spatial dimension, explicit locations.
    pub fn points(longitude: Vec<f64>, latitude: Vec<f64>) -> Self {
        let npts = longitude.len();
        let dims = vec!["point".to_string()];
        let mut coords = BTreeMap::new();
        coords.insert(
            "longitude".to_string(),
            GridCoord {
                dims: dims.clone(),
                values: longitude,
                attrs: VarAttrs {
                    long_name: Some("longitude coordinate".to_string()),
                    units: Some("degree_east".to_string()),
                    standard_name: Some("longitude".to_string()),
                    ..Default::default()
                },
            },
        );
        coords.insert(
            "latitude".to_string(),
            GridCoord {
                dims: dims.clone(),
                values: latitude,
                attrs: VarAttrs {
                    long_name: Some("latitude coordinate".to_string()),
                    units: Some("degree_north".to_string()),
                    standard_name: Some("latitude".to_string()),
                    ..Default::default()
                },
            },
        );
        coords.insert(
            "point".to_string(),
            GridCoord {
                dims: dims.clone(),
                values: (0..npts).map(|i| i as f64).collect(),
                attrs: VarAttrs {
                    long_name: Some("point number".to_string()),
                    ..Default::default()
                },
            },
        );
        Self::new("points", -1, Vec::new(), dims, vec![npts], coords)
    }

    /// CF grid-mapping name.
    pub fn cfname(&self) -> &str {
        &self.cfname
    }

    /// Spatial dimension names, slowest-varying first.
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    /// Spatial shape matching [`Grid::dims`].
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of spatial dimensions: 2 for grids, 1 for point sets.
    pub fn geo_ndim(&self) -> usize {
        self.dims.len()
    }

    /// Total number of grid points.
    pub fn npts(&self) -> usize {
        self.shape.iter().product()
    }

    /// Coordinate variables keyed by name.
    pub fn coords(&self) -> &BTreeMap<String, GridCoord> {
        &self.coords
    }

    /// Attributes of the scalar grid-mapping marker variable.
    pub fn crs_attrs(&self) -> &VarAttrs {
        &self.crs
    }

    /// True when a header carries the same grid definition.
    pub fn same_definition(&self, gdtnum: i32, gdtmpl: &[i32]) -> bool {
        self.gdtnum == gdtnum && self.gdtmpl == gdtmpl
    }
}

/// Resolves a grid-definition template into a [`Grid`].
///
/// Implementations for projected grids live with the external geometry
/// library; [`RegularLatLon`] covers the one template that needs no
/// projection math.
pub trait GeometryProvider {
    fn resolve(&self, gdtnum: i32, gdtmpl: &[i32]) -> Result<Grid>;
}

/// Provider for grid-definition template 0 (regular latitude-longitude).
///
/// Expects the 19-value template layout: 7 earth-shape values, then
/// Ni, Nj, basic angle, subdivisions, La1, Lo1, resolution flags,
/// La2, Lo2, Di, Dj, scan mode. Coordinates are derived arithmetically
/// from the origin and increments.
#[derive(Debug, Default)]
pub struct RegularLatLon;

const LATLON_TEMPLATE: i32 = 0;
const LATLON_TEMPLATE_LEN: usize = 19;

impl GeometryProvider for RegularLatLon {
    fn resolve(&self, gdtnum: i32, gdtmpl: &[i32]) -> Result<Grid> {
        if gdtnum != LATLON_TEMPLATE {
            return Err(DatasetError::UnsupportedGrid(gdtnum));
        }
        if gdtmpl.len() < LATLON_TEMPLATE_LEN {
            return Err(DatasetError::InvalidGridDefinition(format!(
                "template 0 needs {} values, got {}",
                LATLON_TEMPLATE_LEN,
                gdtmpl.len()
            )));
        }

        let ni = gdtmpl[7] as usize;
        let nj = gdtmpl[8] as usize;
        let basic_angle = gdtmpl[9];
        let subdivisions = gdtmpl[10];
        let scale = if basic_angle == 0 {
            1e-6
        } else {
            basic_angle as f64 / subdivisions as f64
        };
        let la1 = gdtmpl[11] as f64 * scale;
        let lo1 = gdtmpl[12] as f64 * scale;
        let la2 = gdtmpl[14] as f64 * scale;
        let di = gdtmpl[16] as f64 * scale;
        let dj = gdtmpl[17] as f64 * scale;

        // Latitudes run from La1 towards La2; longitudes eastwards from Lo1.
        let dj = if la2 >= la1 { dj } else { -dj };
        let latitude: Vec<f64> = (0..nj).map(|j| la1 + j as f64 * dj).collect();
        let longitude: Vec<f64> = (0..ni).map(|i| normalize_lon(lo1 + i as f64 * di)).collect();

        let dims = vec!["latitude".to_string(), "longitude".to_string()];
        let mut coords = BTreeMap::new();
        coords.insert(
            "latitude".to_string(),
            GridCoord {
                dims: vec!["latitude".to_string()],
                values: latitude,
                attrs: VarAttrs {
                    long_name: Some("latitude coordinate".to_string()),
                    units: Some("degree_north".to_string()),
                    standard_name: Some("latitude".to_string()),
                    axis: Some("Y".to_string()),
                    ..Default::default()
                },
            },
        );
        coords.insert(
            "longitude".to_string(),
            GridCoord {
                dims: vec!["longitude".to_string()],
                values: longitude,
                attrs: VarAttrs {
                    long_name: Some("longitude coordinate".to_string()),
                    units: Some("degree_east".to_string()),
                    standard_name: Some("longitude".to_string()),
                    axis: Some("X".to_string()),
                    ..Default::default()
                },
            },
        );

        Ok(Grid::new(
            "latitude_longitude",
            gdtnum,
            gdtmpl.to_vec(),
            dims,
            vec![nj, ni],
            coords,
        ))
    }
}

fn normalize_lon(mut lon: f64) -> f64 {
    while lon > 360.0 {
        lon -= 360.0;
    }
    while lon < 0.0 {
        lon += 360.0;
    }
    lon
}
