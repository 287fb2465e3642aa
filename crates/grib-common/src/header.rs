//! Decoded metadata for one GRIB2 message.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for a single message: variable identity, vertical level,
/// forecast validity times, grid geometry and physical location.
///
/// Header records are produced by an inventory scan of a file and consumed
/// read-only by template construction and index building. The payload itself
/// stays on disk until a lazy-array read asks the engine to decode it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageHeader {
    /// File the message lives in.
    #[serde(default)]
    pub file: PathBuf,
    /// Byte offset of the message within the file.
    pub offset: u64,
    /// Variable short name (e.g. "TMP", "APCP").
    pub varname: String,
    /// Level description text (e.g. "850 mb", "2 m above ground").
    pub level_str: String,
    /// Forecast time description text (e.g. "6 hour fcst", "0-6 hour acc").
    pub time_str: String,
    /// Originating centre.
    pub centre: String,
    /// Originating subcentre.
    pub subcentre: String,
    /// Descriptive variable name (e.g. "Temperature").
    pub long_name: String,
    /// Physical units (e.g. "K").
    pub units: String,
    /// Bottom level type code.
    pub bot_level_code: u16,
    /// Bottom level value in the level type's units.
    pub bot_level_value: f64,
    /// Top level type code (255 when the message has a single level).
    pub top_level_code: u16,
    /// Top level value, when the message spans a layer.
    pub top_level_value: Option<f64>,
    /// Reference (analysis) time shared by all messages of one model run.
    pub reftime: DateTime<Utc>,
    /// Start of the forecast validity interval.
    pub start_ft: DateTime<Utc>,
    /// End of the forecast validity interval.
    pub end_ft: DateTime<Utc>,
    /// Number of grid points in the field.
    pub npts: usize,
    /// Number of columns.
    pub nx: usize,
    /// Number of rows.
    pub ny: usize,
    /// Grid definition template number.
    pub gdtnum: i32,
    /// Raw grid definition template values.
    pub gdtmpl: Vec<i32>,
}

impl MessageHeader {
    /// Shortcut for the bottom level code.
    pub fn level_code(&self) -> u16 {
        self.bot_level_code
    }

    /// Shortcut for the bottom level value.
    pub fn level_value(&self) -> f64 {
        self.bot_level_value
    }

    /// Elapsed time between the reference time and the end of validity.
    pub fn forecast_period(&self) -> Duration {
        self.end_ft - self.reftime
    }

    /// Length of the validity interval; zero for instantaneous fields.
    pub fn interval(&self) -> Duration {
        self.end_ft - self.start_ft
    }

    /// True when both headers describe the same grid definition.
    pub fn same_grid(&self, other: &MessageHeader) -> bool {
        self.gdtnum == other.gdtnum && self.gdtmpl == other.gdtmpl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn header() -> MessageHeader {
        let reftime = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        MessageHeader {
            file: PathBuf::from("run.grib2"),
            offset: 0,
            varname: "TMP".to_string(),
            level_str: "850 mb".to_string(),
            time_str: "6 hour fcst".to_string(),
            centre: "kwbc".to_string(),
            subcentre: "0".to_string(),
            long_name: "Temperature".to_string(),
            units: "K".to_string(),
            bot_level_code: 100,
            bot_level_value: 85000.0,
            top_level_code: 255,
            top_level_value: None,
            reftime,
            start_ft: reftime + Duration::hours(6),
            end_ft: reftime + Duration::hours(6),
            npts: 6,
            nx: 3,
            ny: 2,
            gdtnum: 0,
            gdtmpl: vec![6, 0, 0, 0, 0, 0, 0, 3, 2],
        }
    }

    #[test]
    fn test_forecast_period() {
        let h = header();
        assert_eq!(h.forecast_period(), Duration::hours(6));
        assert_eq!(h.interval(), Duration::zero());
    }

    #[test]
    fn test_same_grid() {
        let a = header();
        let mut b = header();
        assert!(a.same_grid(&b));

        b.gdtmpl[7] = 4;
        assert!(!a.same_grid(&b));
    }
}
