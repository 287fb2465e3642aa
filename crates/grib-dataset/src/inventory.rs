//! Inventory scanning and parsing.
//!
//! The engine's inventory scan emits one line per message:
//!
//! ```text
//! <offset>:<varname>:<level>:<time> meta=<json>
//! ```
//!
//! The readable prefix mirrors classic inventory listings; the JSON payload
//! carries the remaining header fields. Persisting inventories to disk is a
//! caller concern.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use grib_common::MessageHeader;
use grib_engine::{Engine, EngineError};

use crate::dataset::{open_dataset, Dataset};
use crate::error::{DatasetError, Result};
use crate::geometry::GeometryProvider;
use crate::template::{Template, TemplateConfig};

const META_MARKER: &str = " meta=";

/// Header fields carried by the JSON payload of one inventory line.
#[derive(Serialize, Deserialize)]
struct MetaPayload {
    centre: String,
    subcentre: String,
    long_name: String,
    units: String,
    bot_level_code: u16,
    bot_level_value: f64,
    top_level_code: u16,
    top_level_value: Option<f64>,
    reftime: DateTime<Utc>,
    start_ft: DateTime<Utc>,
    end_ft: DateTime<Utc>,
    npts: usize,
    nx: usize,
    ny: usize,
    gdtnum: i32,
    gdtmpl: Vec<i32>,
}

/// Parse a whole inventory text for `file`.
///
/// Blank lines are ignored; a malformed line is a hard error naming the
/// line.
pub fn parse_inventory(file: &Path, text: &str) -> Result<Vec<MessageHeader>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_line(file, line))
        .collect()
}

fn parse_line(file: &Path, line: &str) -> Result<MessageHeader> {
    let invalid = |reason: &str| DatasetError::InvalidInventory(format!("{reason}: {line}"));

    let (head, json) = line
        .split_once(META_MARKER)
        .ok_or_else(|| invalid("missing meta payload"))?;
    let mut fields = head.splitn(4, ':');
    let offset = fields
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| invalid("bad offset"))?;
    let varname = fields.next().ok_or_else(|| invalid("missing variable"))?;
    let level_str = fields.next().ok_or_else(|| invalid("missing level"))?;
    let time_str = fields.next().ok_or_else(|| invalid("missing time"))?;
    let payload: MetaPayload =
        serde_json::from_str(json).map_err(|e| invalid(&format!("bad payload ({e})")))?;

    Ok(MessageHeader {
        file: file.to_path_buf(),
        offset,
        varname: varname.to_string(),
        level_str: level_str.to_string(),
        time_str: time_str.to_string(),
        centre: payload.centre,
        subcentre: payload.subcentre,
        long_name: payload.long_name,
        units: payload.units,
        bot_level_code: payload.bot_level_code,
        bot_level_value: payload.bot_level_value,
        top_level_code: payload.top_level_code,
        top_level_value: payload.top_level_value,
        reftime: payload.reftime,
        start_ft: payload.start_ft,
        end_ft: payload.end_ft,
        npts: payload.npts,
        nx: payload.nx,
        ny: payload.ny,
        gdtnum: payload.gdtnum,
        gdtmpl: payload.gdtmpl,
    })
}

/// Render one header as an inventory line. The counterpart of
/// [`parse_inventory`]; backends and tests use it to produce scan output.
pub fn format_inventory_line(header: &MessageHeader) -> String {
    let payload = MetaPayload {
        centre: header.centre.clone(),
        subcentre: header.subcentre.clone(),
        long_name: header.long_name.clone(),
        units: header.units.clone(),
        bot_level_code: header.bot_level_code,
        bot_level_value: header.bot_level_value,
        top_level_code: header.top_level_code,
        top_level_value: header.top_level_value,
        reftime: header.reftime,
        start_ft: header.start_ft,
        end_ft: header.end_ft,
        npts: header.npts,
        nx: header.nx,
        ny: header.ny,
        gdtnum: header.gdtnum,
        gdtmpl: header.gdtmpl.clone(),
    };
    // MetaPayload has no map-keyed fields, so serialization cannot fail.
    let json = serde_json::to_string(&payload).unwrap_or_default();
    format!(
        "{}:{}:{}:{}{}{}",
        header.offset, header.varname, header.level_str, header.time_str, META_MARKER, json
    )
}

/// Scan one file's inventory through the engine.
///
/// An engine failure is logged and yields an empty list so a bad file never
/// aborts a multi-file scan; a malformed inventory line is still a hard
/// error.
pub fn scan_inventory(engine: &Engine, file: &Path) -> Result<Vec<MessageHeader>> {
    let text = match engine.scan_inventory(file) {
        Ok(text) => text,
        Err(EngineError::Backend(message)) => {
            error!(file = %file.display(), error = %message, "inventory scan failed");
            return Ok(Vec::new());
        }
        Err(err) => return Err(err.into()),
    };
    parse_inventory(file, &text)
}

/// Scan `files` and canonicalize the matching messages into a template.
pub fn make_template(
    engine: &Engine,
    files: &[PathBuf],
    config: TemplateConfig,
    provider: &dyn GeometryProvider,
) -> Result<Option<Template>> {
    let mut headers = Vec::new();
    for file in files {
        headers.extend(scan_inventory(engine, file)?);
    }
    Template::scan(&headers, config, provider)
}

/// Scan `files` and open a dataset against an existing template.
pub fn open_dataset_from_files(
    engine: &Arc<Engine>,
    files: &[PathBuf],
    template: &Template,
) -> Result<Dataset> {
    let mut headers = Vec::new();
    for file in files {
        headers.extend(scan_inventory(engine, file)?);
    }
    open_dataset(&headers, template, Arc::clone(engine))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::test_header;

    #[test]
    fn test_line_round_trip() {
        let header = test_header("TMP", 100, 85000.0, 6, "run.grib2", 1234);
        let line = format_inventory_line(&header);
        let parsed = parse_inventory(Path::new("run.grib2"), &line).unwrap();
        assert_eq!(parsed, vec![header]);
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let header = test_header("TMP", 1, 0.0, 3, "run.grib2", 0);
        let text = format!("\n{}\n\n", format_inventory_line(&header));
        let parsed = parse_inventory(Path::new("run.grib2"), &text).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_malformed_line_is_a_hard_error() {
        let err = parse_inventory(Path::new("run.grib2"), "not an inventory line").unwrap_err();
        assert!(matches!(err, DatasetError::InvalidInventory(_)));

        let err =
            parse_inventory(Path::new("run.grib2"), "abc:TMP:surface:anl meta={}").unwrap_err();
        assert!(matches!(err, DatasetError::InvalidInventory(_)));
    }
}
