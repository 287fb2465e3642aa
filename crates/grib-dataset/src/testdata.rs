//! Test fixtures: an in-memory decode backend and synthetic headers.
//!
//! The backend keeps whole decoded fields in memory, counts decode calls per
//! file, tracks the open-file table, and can be told to fail for chosen
//! files. Headers describe variables on a small 2 x 3 grid resolved by
//! [`TestGeometry`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;

use grib_common::MessageHeader;
use grib_engine::{DecodeBackend, EngineError, WriteRequest};

use crate::attrs::VarAttrs;
use crate::geometry::{GeometryProvider, Grid, GridCoord};
use crate::inventory::format_inventory_line;

/// Rows of the test grid.
pub const TEST_NY: usize = 2;
/// Columns of the test grid.
pub const TEST_NX: usize = 3;

/// Call accounting shared with the test.
#[derive(Default)]
pub struct CallStats {
    /// Batched decode calls per file.
    pub decode_calls: BTreeMap<PathBuf, usize>,
    /// Completed free-file calls.
    pub free_calls: usize,
    /// Files currently in the open-file table.
    pub open_files: BTreeSet<PathBuf>,
}

/// In-memory decode backend.
#[derive(Default)]
pub struct TestBackend {
    fields: BTreeMap<PathBuf, BTreeMap<u64, Vec<f32>>>,
    inventories: BTreeMap<PathBuf, String>,
    fail_files: BTreeSet<PathBuf>,
    stats: Arc<Mutex<CallStats>>,
}

impl TestBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a decoded field for (file, offset).
    pub fn insert_field(&mut self, file: &str, offset: u64, values: Vec<f32>) {
        self.fields
            .entry(PathBuf::from(file))
            .or_default()
            .insert(offset, values);
    }

    /// Store inventory text for a file.
    pub fn insert_inventory(&mut self, file: &str, text: String) {
        self.inventories.insert(PathBuf::from(file), text);
    }

    /// Make every call against `file` fail.
    pub fn fail_on(&mut self, file: &str) {
        self.fail_files.insert(PathBuf::from(file));
    }

    /// Handle to the call accounting, valid after the backend moves into an
    /// engine.
    pub fn stats(&self) -> Arc<Mutex<CallStats>> {
        Arc::clone(&self.stats)
    }

    fn touch(&self, file: &Path) -> Result<(), EngineError> {
        self.stats.lock().open_files.insert(file.to_path_buf());
        if self.fail_files.contains(file) {
            return Err(EngineError::Backend(format!(
                "induced failure: {}",
                file.display()
            )));
        }
        Ok(())
    }
}

impl DecodeBackend for TestBackend {
    fn scan_inventory(&mut self, file: &Path) -> Result<String, EngineError> {
        self.touch(file)?;
        self.inventories
            .get(file)
            .cloned()
            .ok_or_else(|| EngineError::Backend(format!("no inventory: {}", file.display())))
    }

    fn decode_batch(&mut self, file: &Path, offsets: &[u64]) -> Result<Vec<f32>, EngineError> {
        *self
            .stats
            .lock()
            .decode_calls
            .entry(file.to_path_buf())
            .or_default() += 1;
        self.touch(file)?;
        let fields = self
            .fields
            .get(file)
            .ok_or_else(|| EngineError::Backend(format!("no such file: {}", file.display())))?;
        let mut out = Vec::new();
        for offset in offsets {
            let field = fields.get(offset).ok_or_else(|| {
                EngineError::Backend(format!("no message at offset {offset}"))
            })?;
            out.extend_from_slice(field);
        }
        Ok(out)
    }

    fn read_raw(&mut self, file: &Path, offset: u64) -> Result<Vec<u8>, EngineError> {
        self.touch(file)?;
        Ok(format!("GRIB:{}:{}", file.display(), offset).into_bytes())
    }

    fn write_message(&mut self, request: &WriteRequest) -> Result<(), EngineError> {
        self.touch(&request.template_file)?;
        self.touch(&request.file)?;
        let values = match &request.data {
            Some(data) => data.clone(),
            None => self
                .fields
                .get(&request.template_file)
                .and_then(|f| f.get(&request.template_offset))
                .cloned()
                .ok_or_else(|| {
                    EngineError::Backend(format!(
                        "no message at offset {}",
                        request.template_offset
                    ))
                })?,
        };
        self.fields
            .entry(request.file.clone())
            .or_default()
            .insert(request.template_offset, values);
        Ok(())
    }

    fn free_file(&mut self, file: &Path) {
        let mut stats = self.stats.lock();
        if stats.open_files.remove(file) {
            stats.free_calls += 1;
        }
    }
}

/// Geometry provider for the synthetic headers: dims (y, x), shape taken
/// from the grid definition template.
pub struct TestGeometry;

impl GeometryProvider for TestGeometry {
    fn resolve(&self, gdtnum: i32, gdtmpl: &[i32]) -> crate::error::Result<Grid> {
        let nx = gdtmpl[7] as usize;
        let ny = gdtmpl[8] as usize;
        let mut coords = BTreeMap::new();
        coords.insert(
            "y".to_string(),
            GridCoord {
                dims: vec!["y".to_string()],
                values: (0..ny).map(|j| j as f64).collect(),
                attrs: VarAttrs {
                    axis: Some("Y".to_string()),
                    ..Default::default()
                },
            },
        );
        coords.insert(
            "x".to_string(),
            GridCoord {
                dims: vec!["x".to_string()],
                values: (0..nx).map(|i| i as f64).collect(),
                attrs: VarAttrs {
                    axis: Some("X".to_string()),
                    ..Default::default()
                },
            },
        );
        Ok(Grid::new(
            "test_projection",
            gdtnum,
            gdtmpl.to_vec(),
            vec!["y".to_string(), "x".to_string()],
            vec![ny, nx],
            coords,
        ))
    }
}

/// Common reference time of the synthetic run.
pub fn test_reftime() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

/// A header on the 2 x 3 test grid.
pub fn test_header(
    varname: &str,
    level_code: u16,
    level_value: f64,
    fhour: i64,
    file: &str,
    offset: u64,
) -> MessageHeader {
    let reftime = test_reftime();
    let valid = reftime + Duration::hours(fhour);
    let level_str = match level_code {
        1 => "surface".to_string(),
        100 => format!("{} mb", (level_value / 100.0) as i64),
        103 => format!("{} m above ground", level_value),
        code => format!("level {code}"),
    };
    let (long_name, units) = match varname {
        "TMP" => ("Temperature", "K"),
        "UGRD" => ("U-Component of Wind", "m/s"),
        "RH" => ("Relative Humidity", "%"),
        "APCP" => ("Total Precipitation", "kg/m^2"),
        "PRES" => ("Pressure", "Pa"),
        other => (other, "1"),
    };
    MessageHeader {
        file: PathBuf::from(file),
        offset,
        varname: varname.to_string(),
        level_str,
        time_str: format!("{fhour} hour fcst"),
        centre: "kwbc".to_string(),
        subcentre: "0".to_string(),
        long_name: long_name.to_string(),
        units: units.to_string(),
        bot_level_code: level_code,
        bot_level_value: level_value,
        top_level_code: 255,
        top_level_value: None,
        reftime,
        start_ft: valid,
        end_ft: valid,
        npts: TEST_NX * TEST_NY,
        nx: TEST_NX,
        ny: TEST_NY,
        gdtnum: 0,
        gdtmpl: vec![6, 0, 0, 0, 0, 0, 0, TEST_NX as i32, TEST_NY as i32],
    }
}

/// Deterministic field values: `tag * 1000 + point index`.
pub fn test_field(npts: usize, tag: f32) -> Vec<f32> {
    (0..npts).map(|i| tag * 1000.0 + i as f32).collect()
}

/// A backend pre-loaded with inventories and fields for `headers`, one
/// distinct field per header.
pub fn test_backend_for(headers: &[MessageHeader]) -> TestBackend {
    let mut backend = TestBackend::new();
    let mut lines: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
    for (i, header) in headers.iter().enumerate() {
        lines
            .entry(header.file.clone())
            .or_default()
            .push(format_inventory_line(header));
        backend.insert_field(
            header.file.to_string_lossy().as_ref(),
            header.offset,
            test_field(header.npts, (i + 1) as f32),
        );
    }
    for (file, file_lines) in lines {
        backend.insert_inventory(file.to_string_lossy().as_ref(), file_lines.join("\n"));
    }
    backend
}
