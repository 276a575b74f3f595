//! Runtime value types for column access.
//!
//! The [`Value`] enum represents the value of one attribute read from a record
//! by a column accessor. Values are compared, searched and totalled without
//! knowing the concrete record type.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::date;

/// Runtime value of a record attribute, usually borrowed from the record.
///
/// Accessors return this type. Attributes that are absent, null or not
/// applicable to a record are [`Value::None`].
///
/// # Example
///
/// ```
/// use agrilend_browser::{Number, Value};
///
/// struct Farmer {
///     name: String,
///     hectares: f64,
///     middle_name: Option<String>,
/// }
///
/// fn name(f: &Farmer) -> Value<'_> {
///     Value::from(f.name.as_str())
/// }
///
/// fn hectares(f: &Farmer) -> Value<'_> {
///     Value::Number(Number::F64(f.hectares))
/// }
///
/// fn middle_name(f: &Farmer) -> Value<'_> {
///     Value::from(f.middle_name.as_deref())
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// String value (borrowed).
    String(&'a str),
    /// Computed string value.
    Owned(String),
    /// Numeric value.
    Number(Number),
    /// Timestamp value (milliseconds since Unix epoch).
    Timestamp(Timestamp),
    /// Boolean value.
    Bool(bool),
    /// Attribute not present or null.
    None,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `None` value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns `true` for borrowed and owned strings.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_) | Value::Owned(_))
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Owned(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Reads the value as a point in time.
    ///
    /// Timestamps are returned as-is, date-like strings are parsed and numbers
    /// are taken as epoch milliseconds. Anything else, including strings that
    /// do not parse, yields `None`.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            Value::String(s) => date::parse_date_like(s),
            Value::Owned(s) => date::parse_date_like(s),
            Value::Number(n) => {
                let ms = n.to_f64();
                ms.is_finite().then(|| Timestamp(ms as i64))
            }
            _ => None,
        }
    }

    /// Coerces the value to text the way a display cell would show it.
    ///
    /// Returns `None` for [`Value::None`] so callers can tell "missing" apart
    /// from "empty string".
    pub fn coerce_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some((*s).to_string()),
            Value::Owned(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Timestamp(t) => Some(t.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::None => None,
        }
    }

    /// Coerces the value to a number for totals.
    ///
    /// Numeric strings are parsed; everything non-numeric (including NaN,
    /// booleans, timestamps and missing values) counts as zero.
    pub fn coerce_number(&self) -> f64 {
        let n = match self {
            Value::Number(n) => n.to_f64(),
            Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            Value::Owned(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        };
        if n.is_nan() {
            0.0
        } else {
            n
        }
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::String(s)
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(s: &'a String) -> Self {
        Value::String(s.as_str())
    }
}

impl From<String> for Value<'_> {
    fn from(s: String) -> Self {
        Value::Owned(s)
    }
}

impl From<Number> for Value<'_> {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<Timestamp> for Value<'_> {
    fn from(t: Timestamp) -> Self {
        Value::Timestamp(t)
    }
}

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value<'_> {
    fn from(n: i64) -> Self {
        Value::Number(Number::I64(n))
    }
}

impl From<u32> for Value<'_> {
    fn from(n: u32) -> Self {
        Value::Number(Number::U64(n as u64))
    }
}

impl From<u64> for Value<'_> {
    fn from(n: u64) -> Self {
        Value::Number(Number::U64(n))
    }
}

impl From<f64> for Value<'_> {
    fn from(n: f64) -> Self {
        Value::Number(Number::F64(n))
    }
}

impl<'a, V> From<Option<V>> for Value<'a>
where
    V: Into<Value<'a>>,
{
    fn from(v: Option<V>) -> Self {
        v.map(Into::into).unwrap_or(Value::None)
    }
}

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision.
/// Comparisons between different variants go through `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    /// Integral floats print without a fractional part (`12`, not `12.0`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{n}"),
            Number::U64(n) => write!(f, "{n}"),
            Number::F64(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Number::F64(n) => write!(f, "{n}"),
        }
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::U64(n as u64)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::U64(n)
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        Number::U64(n as u64)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::F64(n)
    }
}

/// Point in time as milliseconds since the Unix epoch.
///
/// Timestamps are timezone-free: the calendar day of a timestamp is the UTC
/// calendar day of its millisecond value.
///
/// ```
/// use agrilend_browser::Timestamp;
///
/// let ts = Timestamp::from_ymd(2024, 3, 15).unwrap();
/// assert_eq!(ts.to_string(), "2024-03-15T00:00:00.000Z");
/// assert!(ts < ts.end_of_day());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Midnight at the start of the given calendar day.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        Some(Self::from_date(date))
    }

    /// Midnight at the start of `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::from_datetime(date.and_time(chrono::NaiveTime::MIN))
    }

    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Timestamp(dt.and_utc().timestamp_millis())
    }

    pub fn to_datetime(self) -> Option<NaiveDateTime> {
        DateTime::from_timestamp_millis(self.0).map(|dt| dt.naive_utc())
    }

    /// Calendar day of this timestamp.
    pub fn date(self) -> Option<NaiveDate> {
        self.to_datetime().map(|dt| dt.date())
    }

    /// 00:00:00.000 on the same calendar day.
    pub fn start_of_day(self) -> Self {
        self.date().map(Self::from_date).unwrap_or(self)
    }

    /// 23:59:59.999 on the same calendar day.
    pub fn end_of_day(self) -> Self {
        self.date()
            .and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999))
            .map(Self::from_datetime)
            .unwrap_or(self)
    }

    /// Whether both timestamps fall on the same calendar day.
    pub fn same_day(self, other: Timestamp) -> bool {
        match (self.date(), other.date()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(date: NaiveDate) -> Self {
        Timestamp::from_date(date)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Timestamp::from_datetime(dt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_extractors() {
        assert_eq!(Value::String("hello").as_str(), Some("hello"));
        assert_eq!(Value::Owned("hi".into()).as_str(), Some("hi"));
        assert_eq!(
            Value::Number(Number::I64(42)).as_number(),
            Some(Number::I64(42))
        );
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::String("test").as_number(), None);
        assert_eq!(Value::Number(Number::I64(1)).as_str(), None);
    }

    #[test]
    fn coerce_string_matches_display_rules() {
        assert_eq!(Value::from(12.0).coerce_string().as_deref(), Some("12"));
        assert_eq!(Value::from(2.5).coerce_string().as_deref(), Some("2.5"));
        assert_eq!(Value::from(-3i64).coerce_string().as_deref(), Some("-3"));
        assert_eq!(Value::Bool(false).coerce_string().as_deref(), Some("false"));
        assert_eq!(Value::None.coerce_string(), None);
        assert_eq!(Value::String("").coerce_string().as_deref(), Some(""));
    }

    #[test]
    fn coerce_number_treats_garbage_as_zero() {
        assert_eq!(Value::from(4u64).coerce_number(), 4.0);
        assert_eq!(Value::String(" 12.5 ").coerce_number(), 12.5);
        assert_eq!(Value::String("n/a").coerce_number(), 0.0);
        assert_eq!(Value::from(f64::NAN).coerce_number(), 0.0);
        assert_eq!(Value::Bool(true).coerce_number(), 0.0);
        assert_eq!(Value::None.coerce_number(), 0.0);
    }

    #[test]
    fn option_conversion() {
        let missing: Option<&str> = None;
        assert_eq!(Value::from(missing), Value::None);
        assert_eq!(Value::from(Some("x")), Value::String("x"));
    }

    #[test]
    fn as_timestamp_parses_date_strings() {
        let expected = Timestamp::from_ymd(2024, 1, 5).unwrap();
        assert_eq!(Value::String("2024-01-05").as_timestamp(), Some(expected));
        assert_eq!(Value::Timestamp(expected).as_timestamp(), Some(expected));
        assert_eq!(
            Value::from(expected.as_millis()).as_timestamp(),
            Some(expected)
        );
        assert_eq!(Value::String("yesterday").as_timestamp(), None);
        assert_eq!(Value::None.as_timestamp(), None);
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(
            Number::I64(5).compare(Number::U64(10)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(5).compare(Number::F64(5.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
    }

    #[test]
    fn timestamp_day_bounds() {
        let noon = Timestamp::from_datetime(
            NaiveDate::from_ymd_opt(2024, 2, 29)
                .unwrap()
                .and_hms_opt(12, 30, 0)
                .unwrap(),
        );
        assert_eq!(noon.start_of_day().to_string(), "2024-02-29T00:00:00.000Z");
        assert_eq!(noon.end_of_day().to_string(), "2024-02-29T23:59:59.999Z");
        assert!(noon.same_day(noon.end_of_day()));
        assert!(!noon.same_day(Timestamp(noon.end_of_day().0 + 1)));
    }
}
