//! Sparse file index: logical coordinates to byte offsets.
//!
//! An index build resolves each header's forecast period and level value
//! against the template's canonical axes and records where the message
//! lives. Headers that do not fit are dropped with a diagnostic; a build
//! never aborts on individual messages.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, info};

use grib_common::{period_seconds, MessageHeader};

use crate::template::{CoordValues, Template, VarSpec};

/// Resolved axis positions of one message: up to two entries, time position
/// first, level position second. Variables with scalar time and no vertical
/// dimension have an empty tuple.
pub type HeaderCoord = Vec<usize>;

/// Per-file offset map for one variable.
pub type FileIndex = BTreeMap<PathBuf, BTreeMap<HeaderCoord, u64>>;

/// Index for every variable that had at least one surviving header.
pub type FileIndexes = BTreeMap<String, FileIndex>;

/// Build the sparse index for a stream of headers against a template.
///
/// The stream may span many files and may carry reference times the
/// template never saw; such headers resolve to nothing and are excluded
/// silently. A later header mapping to an occupied coordinate overwrites
/// the earlier offset (last write wins).
pub fn build_file_index(headers: &[MessageHeader], template: &Template) -> FileIndexes {
    let mut indexes = FileIndexes::new();
    for header in headers {
        if !template.matches(header) {
            continue;
        }
        let varname = template.variable_name(header);
        let spec = match template.var_specs().get(&varname) {
            Some(spec) => spec,
            None => {
                info!(var = %varname, "variable not found in template, skipping");
                continue;
            }
        };
        let coord = match resolve_header_coord(header, &varname, spec, template) {
            Some(coord) => coord,
            None => continue,
        };

        let previous = indexes
            .entry(varname.clone())
            .or_default()
            .entry(header.file.clone())
            .or_default()
            .insert(coord, header.offset);
        if let Some(old) = previous {
            debug!(
                var = %varname,
                file = %header.file.display(),
                old_offset = old,
                new_offset = header.offset,
                "duplicate header coordinate, keeping the later message"
            );
        }
    }
    indexes
}

/// Resolve a header's (time, level) positions, or None with a diagnostic.
fn resolve_header_coord(
    header: &MessageHeader,
    varname: &str,
    spec: &VarSpec,
    template: &Template,
) -> Option<HeaderCoord> {
    let mut coord = HeaderCoord::new();

    let period = period_seconds(header.forecast_period());
    let time_values = match &template.coord(&spec.time_coord)?.values {
        CoordValues::Seconds(values) => values,
        CoordValues::Float(_) => return None,
    };
    if spec.has_time_dim() {
        match time_values.iter().position(|v| *v == period) {
            Some(i) => coord.push(i),
            None => {
                info!(
                    var = %varname,
                    period_seconds = period,
                    "forecast time not found in template, skipping"
                );
                return None;
            }
        }
    } else if time_values.first() != Some(&period) {
        info!(
            var = %varname,
            period_seconds = period,
            "forecast time not found in template, skipping"
        );
        return None;
    }

    if let Some(level_coord) = &spec.level_coord {
        let level_values = match &template.coord(level_coord)?.values {
            CoordValues::Float(values) => values,
            CoordValues::Seconds(_) => return None,
        };
        match level_values
            .iter()
            .position(|v| *v == header.bot_level_value)
        {
            Some(i) => coord.push(i),
            None => {
                info!(
                    var = %varname,
                    level = header.bot_level_value,
                    "level not found in template, skipping"
                );
                return None;
            }
        }
    }
    Some(coord)
}
