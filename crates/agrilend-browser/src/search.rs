//! Free-text search across all columns.

use crate::schema::ColumnSpec;

/// Lower-cased search needle; an empty query matches everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchNeedle(Option<String>);

impl SearchNeedle {
    pub fn new(query: &str) -> Self {
        if query.is_empty() {
            SearchNeedle(None)
        } else {
            SearchNeedle(Some(query.to_lowercase()))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// A record matches when any column value, coerced to text and
    /// lower-cased, contains the needle. Missing values never match.
    pub fn matches<T>(&self, record: &T, columns: &[ColumnSpec<T>]) -> bool {
        let Some(needle) = &self.0 else {
            return true;
        };
        columns.iter().any(|column| {
            column
                .value(record)
                .coerce_string()
                .is_some_and(|text| text.to_lowercase().contains(needle.as_str()))
        })
    }
}
