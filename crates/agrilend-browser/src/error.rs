//! Error types for the browser crate.

use thiserror::Error;

/// Errors raised while building a schema or dispatching actions.
///
/// The browse pipeline itself never fails: bad filter values, unknown
/// columns and unparseable dates degrade to "no match" or "ignored".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BrowserError {
    /// The schema's key column is not among its columns.
    #[error("key column '{0}' is not defined in the schema")]
    MissingKeyColumn(String),

    /// Two columns share the same id.
    #[error("duplicate column id '{0}'")]
    DuplicateColumn(String),

    /// Two filters share the same id.
    #[error("duplicate filter id '{0}'")]
    DuplicateFilter(String),

    /// No row or bulk action carries the given label.
    #[error("no action labelled '{0}'")]
    UnknownAction(String),

    /// No loaded record has the given key.
    #[error("no record with key '{0}'")]
    UnknownRecord(String),

    /// A date filter value could not be parsed.
    #[error("invalid date '{0}'")]
    InvalidDate(String),
}

/// Result type for browser operations.
pub type Result<T> = std::result::Result<T, BrowserError>;
