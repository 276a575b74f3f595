//! Lenient parsing of date-like attribute strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{BrowserError, Result};
use crate::value::Timestamp;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parses a date-like string into a timestamp.
///
/// Accepts RFC 3339 (offsets are converted to UTC), ISO date-times without
/// an offset, and plain calendar dates. Returns `None` for anything else.
pub fn parse_date_like(input: &str) -> Option<Timestamp> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(Timestamp::from_datetime(dt.naive_utc()));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Timestamp::from_datetime(dt));
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(Timestamp::from_date(d));
        }
    }

    None
}

/// Strict variant of [`parse_date_like`] for user-supplied filter values.
pub fn parse_date(input: &str) -> Result<Timestamp> {
    parse_date_like(input).ok_or_else(|| BrowserError::InvalidDate(input.to_string()))
}
