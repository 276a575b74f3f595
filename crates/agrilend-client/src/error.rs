//! Client error types.

use thiserror::Error;

/// Errors surfaced by record sources, option sources and the request layer.
///
/// Messages are safe to show inline on a screen: upstream response bodies are
/// never included.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The mock service has no record with this id.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: String, id: String },

    /// The backend answered 401. The session handler has been notified.
    #[error("your session has expired, please sign in again")]
    SessionExpired,

    /// Non-success HTTP status other than 401.
    #[error("request failed with HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Transport failure before a status was received.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("could not read response: {0}")]
    Decode(String),

    /// The configured base URL or a request path is not a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A collaborator service returned something unusable.
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl ClientError {
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        ClientError::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// HTTP error whose message is the status's canonical reason.
    pub fn http(status: u16) -> Self {
        let message = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("unexpected status")
            .to_string();
        ClientError::Http { status, message }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
