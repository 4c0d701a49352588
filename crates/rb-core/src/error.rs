//! # SyncError
//!
//! Centralized error handling for board sync.
//! Every failure of a store round-trip maps onto one of these variants.

use thiserror::Error;

/// The primary error type for all rb-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The request never produced a response (DNS, connect, timeout, ...)
    #[error("network error: {0}")]
    Network(String),

    /// The store answered with a non-success status
    #[error("http error {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body could not be decoded
    #[error("invalid payload: {0}")]
    Decode(String),

    /// The addressed record does not exist
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: String, id: String },

    /// Settings are missing or malformed
    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http { status, message: message.into() }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound { entity: entity.into(), id: id.into() }
    }

    /// HTTP status for `Http` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// A specialized Result type for board sync.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_only_for_http_errors() {
        assert_eq!(SyncError::http(503, "down").status(), Some(503));
        assert_eq!(SyncError::Network("refused".into()).status(), None);
    }

    #[test]
    fn display_includes_context() {
        assert_eq!(SyncError::http(404, "gone").to_string(), "http error 404: gone");
        assert_eq!(
            SyncError::not_found("board", "K9").to_string(),
            "board not found with ID K9"
        );
    }
}
