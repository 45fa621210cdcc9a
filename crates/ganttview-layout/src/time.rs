//! Instant parsing and human-readable date/duration strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use ganttview_core::{FieldValue, NormalizeError};

/// Absolute bound on epoch milliseconds accepted from numeric input
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Instant from epoch seconds, kept at millisecond precision
pub fn from_epoch_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    let millis = (seconds * 1000.0).trunc();
    if !millis.is_finite() || millis.abs() > MAX_EPOCH_MILLIS {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

/// Parse a free-form date/time string; naive values are UTC
pub fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Utc.from_utc_datetime(&naive));
        }
    }
    None
}

/// Interpret a record value as an instant.
///
/// Numbers (and numeric text) are epoch seconds; anything else goes
/// through [`parse_datetime`].
pub fn parse_instant(field: &str, value: &FieldValue) -> Result<DateTime<Utc>, NormalizeError> {
    if let Some(seconds) = value.as_number() {
        if !seconds.is_finite() {
            return Err(unparseable(field, value));
        }
        return from_epoch_seconds(seconds).ok_or(NormalizeError::OutOfRange);
    }
    match value {
        FieldValue::Text(text) => parse_datetime(text).ok_or_else(|| unparseable(field, value)),
        _ => Err(unparseable(field, value)),
    }
}

fn unparseable(field: &str, value: &FieldValue) -> NormalizeError {
    NormalizeError::UnparseableTime {
        field: field.to_string(),
        value: value.as_text().map(|t| t.into_owned()).unwrap_or_default(),
    }
}

/// Tooltip date: `Jan 5, 2025`, with ` HH:MM` or ` HH:MM:SS` when the time of day is set
pub fn date_str(dt: &DateTime<Utc>) -> String {
    let mut out = dt.format("%b %-d, %Y").to_string();
    if dt.hour() != 0 || dt.minute() != 0 || dt.second() != 0 {
        if dt.second() == 0 {
            out.push_str(&dt.format(" %H:%M").to_string());
        } else {
            out.push_str(&dt.format(" %H:%M:%S").to_string());
        }
    }
    out
}

/// Tooltip duration: `01d 02h 03m 04s`, zero components omitted
pub fn duration_str(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0s".to_string();
    }
    let days = (seconds / 86_400.0).trunc() as u64;
    let hours = (seconds / 3_600.0).trunc() as u64 % 24;
    let minutes = (seconds / 60.0).trunc() as u64 % 60;
    let secs = seconds % 60.0;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{:02}d", days));
    }
    if hours > 0 {
        parts.push(format!("{:02}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{:02}m", minutes));
    }
    if secs.fract() == 0.0 && secs > 0.0 {
        parts.push(format!("{:02}s", secs as u64));
    } else if secs >= 0.05 {
        parts.push(format!("{:04.1}s", secs));
    }
    if parts.is_empty() {
        // Sub-decisecond remainder only
        return format!("{:.3}s", secs);
    }
    parts.join(" ")
}
