//! Time-of-day arithmetic and calendar helpers shared by the aggregations.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

/// Monday-first weekday abbreviations, independent of the process locale.
pub const WEEKDAY_ABBR: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Number of weekday buckets.
pub const DAYS_IN_WEEK: usize = 7;

/// Seconds elapsed since midnight for a time of day.
pub fn seconds_since_midnight(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 3600 + i64::from(time.minute()) * 60 + i64::from(time.second())
}

/// Signed presence duration in seconds.
///
/// Negative when `end` precedes `start`; the value is passed through unclamped.
pub fn duration(start: NaiveTime, end: NaiveTime) -> i64 {
    seconds_since_midnight(end) - seconds_since_midnight(start)
}

/// Arithmetic mean. Returns exactly `0.0` for an empty slice.
pub fn mean(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64
}

/// Monday-first weekday index (0 = Monday, 6 = Sunday).
pub fn weekday_index(day: NaiveDate) -> usize {
    day.weekday().num_days_from_monday() as usize
}

/// Abbreviated weekday name for a Monday-first index.
///
/// Returns `None` for indices outside `0..7`.
pub fn weekday_abbr(index: usize) -> Option<&'static str> {
    WEEKDAY_ABBR.get(index).copied()
}

/// `YYYY-MM` key for the month a day belongs to.
pub fn month_key(day: NaiveDate) -> String {
    format!("{:04}-{:02}", day.year(), day.month())
}
