//! Error types for the picker crate.

use thiserror::Error;

/// Errors raised when reading dates typed by the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PickerError {
    /// The input is not a `YYYY-MM-DD` calendar day.
    #[error("invalid date '{input}': {source}")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A range whose end precedes its start was given explicitly.
    #[error("range ends ({to}) before it starts ({from})")]
    InvertedRange { from: String, to: String },
}

/// Result type for picker operations.
pub type Result<T> = std::result::Result<T, PickerError>;
