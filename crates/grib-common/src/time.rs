//! Forecast-period arithmetic and statistical-period labels.

use chrono::Duration;

/// Statistical time-range modifiers that mark a message as carrying a value
/// computed over an interval rather than an instantaneous field.
///
/// Matched as space-delimited words of the header's time text, so "acc" does
/// not fire on variable names that merely contain the letters.
pub const TIME_MODIFIERS: &[&str] = &[
    "ave",
    "acc",
    "max",
    "min",
    "last-first",
    "RMS",
    "StdDev",
    "covar",
    "first-last",
    "ratio",
    "standardized anomaly",
    "summation",
];

/// Whole seconds of a forecast period, used for axis values and hashing.
pub fn period_seconds(period: Duration) -> i64 {
    period.num_seconds()
}

/// Statistical-period suffix for a variable name, or None for instantaneous
/// messages.
///
/// A suffix is produced only when the time text names one of the
/// [`TIME_MODIFIERS`] and the validity interval is positive. The count is
/// expressed in the largest whole unit (minutes, hours, days) that divides
/// the interval exactly, e.g. "6_hour_acc" or "90_min_ave".
pub fn period_label(time_str: &str, interval: Duration) -> Option<String> {
    if interval <= Duration::zero() {
        return None;
    }
    let padded = format!(" {} ", time_str);
    let modifier = TIME_MODIFIERS
        .iter()
        .find(|m| padded.contains(&format!(" {} ", m)))?;

    let minutes = interval.num_minutes();
    let count = if minutes > 0 && minutes % (24 * 60) == 0 {
        format!("{}_day", minutes / (24 * 60))
    } else if minutes > 0 && minutes % 60 == 0 {
        format!("{}_hour", minutes / 60)
    } else {
        format!("{}_min", minutes)
    };
    Some(format!("{}_{}", count, modifier.replace(' ', "_")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instantaneous_has_no_label() {
        assert_eq!(period_label("6 hour fcst", Duration::zero()), None);
        assert_eq!(period_label("anl", Duration::zero()), None);
    }

    #[test]
    fn test_plain_forecast_interval_has_no_label() {
        // A positive interval without a statistical modifier stays unnamed.
        assert_eq!(period_label("102 hour fcst", Duration::hours(6)), None);
    }

    #[test]
    fn test_hour_label() {
        assert_eq!(
            period_label("0-6 hour acc fcst", Duration::hours(6)),
            Some("6_hour_acc".to_string())
        );
    }

    #[test]
    fn test_day_label() {
        assert_eq!(
            period_label("0-2 day ave fcst", Duration::days(2)),
            Some("2_day_ave".to_string())
        );
    }

    #[test]
    fn test_minute_label() {
        assert_eq!(
            period_label("0-90 min ave fcst", Duration::minutes(90)),
            Some("90_min_ave".to_string())
        );
    }

    #[test]
    fn test_day_carry_uses_hours() {
        // 30 hours is not a whole number of days; hours divide it exactly.
        assert_eq!(
            period_label("6-36 hour acc fcst", Duration::hours(30)),
            Some("30_hour_acc".to_string())
        );
    }

    #[test]
    fn test_multi_word_modifier() {
        assert_eq!(
            period_label("0-6 hour standardized anomaly fcst", Duration::hours(6)),
            Some("6_hour_standardized_anomaly".to_string())
        );
    }
}
