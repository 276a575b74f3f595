//! Filter values and per-kind matching.
//!
//! The canonical "inactive" representation of a filter is its absence from
//! the [`FilterMap`]. Setting an empty string or the `"all"` sentinel removes
//! the entry, so every inactive spelling collapses to the same state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::date;
use crate::error::Result;
use crate::schema::{Accessor, FilterKind, Schema};
use crate::value::{Timestamp, Value};

/// Reserved select value meaning "no filtering".
pub const ALL_SENTINEL: &str = "all";

/// Inclusive date range; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

impl DateRange {
    pub fn new(from: Option<Timestamp>, to: Option<Timestamp>) -> Self {
        DateRange { from, to }
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Whether `ts` lies within the range after widening the bounds to
    /// whole days (`from` at 00:00:00.000, `to` at 23:59:59.999).
    pub fn contains(&self, ts: Timestamp) -> bool {
        if let Some(from) = self.from {
            if ts < from.start_of_day() {
                return false;
            }
        }
        if let Some(to) = self.to {
            if ts > to.end_of_day() {
                return false;
            }
        }
        true
    }
}

/// Value held by one filter control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterValue {
    /// Select or free-text value.
    Text(String),
    /// Single calendar day.
    Date(Timestamp),
    /// Date range.
    Range(DateRange),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        FilterValue::Text(value.into())
    }

    /// Parses a user-supplied date into a [`FilterValue::Date`].
    pub fn parse_date(input: &str) -> Result<Self> {
        date::parse_date(input).map(FilterValue::Date)
    }

    /// Parses optional range bounds into a [`FilterValue::Range`].
    pub fn parse_range(from: Option<&str>, to: Option<&str>) -> Result<Self> {
        let from = from.map(date::parse_date).transpose()?;
        let to = to.map(date::parse_date).transpose()?;
        Ok(FilterValue::Range(DateRange { from, to }))
    }

    /// Whether this value restricts anything.
    pub fn is_active(&self) -> bool {
        match self {
            FilterValue::Text(s) => {
                let s = s.trim();
                !s.is_empty() && !s.eq_ignore_ascii_case(ALL_SENTINEL)
            }
            FilterValue::Date(_) => true,
            FilterValue::Range(r) => !r.is_empty(),
        }
    }

    /// Same value with surrounding whitespace stripped from text.
    pub fn normalized(self) -> Self {
        match self {
            FilterValue::Text(s) if s.trim().len() != s.len() => {
                FilterValue::Text(s.trim().to_string())
            }
            other => other,
        }
    }

    /// Short human description, used in filter summaries.
    pub fn describe(&self) -> String {
        match self {
            FilterValue::Text(s) => s.clone(),
            FilterValue::Date(ts) => format_day(*ts),
            FilterValue::Range(r) => format!(
                "{}..{}",
                r.from.map(format_day).unwrap_or_default(),
                r.to.map(format_day).unwrap_or_default()
            ),
        }
    }

    /// Tests one attribute value against this filter.
    ///
    /// Date values always use date semantics whatever the declared kind;
    /// a text value on a date kind is parsed as a single day. Missing or
    /// unparseable dates never match.
    pub fn matches(&self, kind: FilterKind, value: &Value<'_>) -> bool {
        match (kind, self) {
            (_, FilterValue::Date(day)) => value.as_timestamp().is_some_and(|ts| ts.same_day(*day)),
            (_, FilterValue::Range(range)) => {
                value.as_timestamp().is_some_and(|ts| range.contains(ts))
            }
            (FilterKind::Select, FilterValue::Text(wanted)) => {
                value.coerce_string().is_some_and(|s| s == *wanted)
            }
            (FilterKind::Text, FilterValue::Text(needle)) => {
                let needle = needle.to_lowercase();
                value
                    .coerce_string()
                    .is_some_and(|s| s.to_lowercase().contains(&needle))
            }
            (FilterKind::Date | FilterKind::DateRange, FilterValue::Text(text)) => {
                match (date::parse_date_like(text), value.as_timestamp()) {
                    (Some(day), Some(ts)) => ts.same_day(day),
                    _ => false,
                }
            }
        }
    }

    /// Kind assumed for a filter that has a column but no filter spec.
    fn implied_kind(&self) -> FilterKind {
        match self {
            FilterValue::Text(_) => FilterKind::Select,
            FilterValue::Date(_) => FilterKind::Date,
            FilterValue::Range(_) => FilterKind::DateRange,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<Timestamp> for FilterValue {
    fn from(ts: Timestamp) -> Self {
        FilterValue::Date(ts)
    }
}

impl From<DateRange> for FilterValue {
    fn from(range: DateRange) -> Self {
        FilterValue::Range(range)
    }
}

fn format_day(ts: Timestamp) -> String {
    ts.date()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Active filter values keyed by filter id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterMap {
    values: BTreeMap<String, FilterValue>,
}

impl FilterMap {
    pub fn new() -> Self {
        FilterMap::default()
    }

    /// Sets a filter. Inactive values remove the entry instead.
    ///
    /// Returns `true` if the map changed.
    pub fn set(&mut self, id: impl Into<String>, value: impl Into<FilterValue>) -> bool {
        let id = id.into();
        let value = value.into().normalized();
        if value.is_active() {
            self.values.insert(id, value.clone()) != Some(value)
        } else {
            self.values.remove(&id).is_some()
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.values.remove(id).is_some()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn get(&self, id: &str) -> Option<&FilterValue> {
        self.values.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `"status=Active, planted=2024-01-01..2024-03-31"`; `None` when empty.
    pub fn summary(&self) -> Option<String> {
        if self.values.is_empty() {
            return None;
        }
        Some(
            self.values
                .iter()
                .map(|(id, v)| format!("{id}={}", v.describe()))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }

    /// Resolves each active filter against the schema.
    ///
    /// Filters with neither a filter spec nor a column of the same id are
    /// dropped here, which makes them always-true.
    pub fn resolve<'s, T>(&'s self, schema: &Schema<T>) -> Vec<ResolvedFilter<'s, T>> {
        let mut resolved = Vec::with_capacity(self.values.len());
        for (id, value) in &self.values {
            let spec = schema.filter(id);
            let accessor = spec
                .and_then(|s| s.own_accessor())
                .or_else(|| schema.column(id).map(|c| c.accessor()));
            let Some(accessor) = accessor else {
                log::debug!("ignoring filter '{id}': no filter or column with that id");
                continue;
            };
            let kind = spec.map(|s| s.kind).unwrap_or_else(|| value.implied_kind());
            resolved.push(ResolvedFilter {
                kind,
                accessor,
                value,
            });
        }
        resolved
    }
}

/// A filter bound to the accessor it reads.
pub struct ResolvedFilter<'s, T> {
    pub kind: FilterKind,
    pub accessor: Accessor<T>,
    pub value: &'s FilterValue,
}

impl<T> ResolvedFilter<'_, T> {
    pub fn matches(&self, record: &T) -> bool {
        self.value.matches(self.kind, &(self.accessor)(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    fn day(y: i32, m: u32, d: u32) -> Timestamp {
        Timestamp::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn sentinel_and_empty_are_inactive() {
        assert!(!FilterValue::text("").is_active());
        assert!(!FilterValue::text("  ").is_active());
        assert!(!FilterValue::text("all").is_active());
        assert!(!FilterValue::text("ALL").is_active());
        assert!(!FilterValue::Range(DateRange::default()).is_active());
        assert!(FilterValue::text("Active").is_active());
        assert!(FilterValue::Date(day(2024, 1, 1)).is_active());
    }

    #[test]
    fn map_collapses_inactive_spellings() {
        let mut map = FilterMap::new();
        assert!(map.set("status", "Active"));
        assert!(!map.set("status", "Active"));
        assert!(map.set("status", "all"));
        assert!(map.is_empty());
        assert!(!map.set("status", ""));
        assert!(map.is_empty());
    }

    #[test]
    fn padded_text_is_stored_trimmed() {
        let mut map = FilterMap::new();
        assert!(map.set("status", " Active "));
        assert_eq!(map.get("status"), Some(&FilterValue::text("Active")));
        assert!(!map.set("status", "Active"));
        assert!(!map.set("status", "Active  "));
        assert_eq!(map.summary().as_deref(), Some("status=Active"));
    }

    #[test]
    fn select_is_exact_after_coercion() {
        let f = FilterValue::text("3");
        let three = Value::Number(Number::I64(3));
        assert!(f.matches(FilterKind::Select, &three));
        assert!(f.matches(FilterKind::Select, &Value::String("3")));
        assert!(!f.matches(FilterKind::Select, &Value::String("33")));
        assert!(!f.matches(FilterKind::Select, &Value::None));
    }

    #[test]
    fn text_is_case_insensitive_substring() {
        let f = FilterValue::text("RICE");
        assert!(f.matches(FilterKind::Text, &Value::String("Hybrid rice")));
        assert!(!f.matches(FilterKind::Text, &Value::String("Corn")));
        assert!(!f.matches(FilterKind::Text, &Value::None));
    }

    #[test]
    fn single_date_ignores_time_of_day() {
        let f = FilterValue::Date(day(2024, 5, 1));
        let late = Value::String("2024-05-01T23:10:00");
        assert!(f.matches(FilterKind::Date, &late));
        assert!(!f.matches(FilterKind::Date, &Value::String("2024-05-02")));
        assert!(!f.matches(FilterKind::Date, &Value::String("garbage")));
        assert!(!f.matches(FilterKind::Date, &Value::None));
    }

    #[test]
    fn text_value_on_date_kind_is_parsed() {
        let f = FilterValue::text("2024-05-01");
        let morning = Value::String("2024-05-01T08:00:00");
        assert!(f.matches(FilterKind::Date, &morning));
        let bad = FilterValue::text("someday");
        assert!(!bad.matches(FilterKind::Date, &Value::String("2024-05-01")));
    }

    #[test]
    fn range_bounds_are_whole_days() {
        let range = DateRange::new(Some(day(2024, 1, 10)), Some(day(2024, 1, 20)));
        assert!(range.contains(day(2024, 1, 10)));
        assert!(range.contains(day(2024, 1, 20).end_of_day()));
        let after = Timestamp(day(2024, 1, 20).end_of_day().0 + 1);
        assert!(!range.contains(after));
        assert!(!range.contains(Timestamp(day(2024, 1, 10).0 - 1)));

        let open_end = DateRange::new(Some(day(2024, 1, 10)), None);
        assert!(open_end.contains(day(2099, 1, 1)));
        let open_start = DateRange::new(None, Some(day(2024, 1, 10)));
        assert!(open_start.contains(day(1999, 1, 1)));
        assert!(!open_start.contains(day(2024, 1, 11)));
    }

    #[test]
    fn parse_range_reports_bad_bounds() {
        assert!(FilterValue::parse_range(Some("2024-01-01"), None).is_ok());
        assert!(FilterValue::parse_range(Some("nope"), None).is_err());
    }

    #[test]
    fn summary_lists_filters() {
        let mut map = FilterMap::new();
        map.set("status", "Active");
        map.set(
            "planted",
            DateRange::new(Some(day(2024, 1, 1)), Some(day(2024, 3, 31))),
        );
        assert_eq!(
            map.summary().as_deref(),
            Some("planted=2024-01-01..2024-03-31, status=Active")
        );
        assert_eq!(FilterMap::new().summary(), None);
    }
}
