// ================================================================
// File: snapgrade-common/src/error.rs
// ================================================================

use thiserror::Error;

/// Errors raised while building shared models.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

/// Failure reported by an analysis backend.
///
/// `Unavailable` covers everything that kept the backend from answering
/// (missing configuration, network failure, non-success status, timeout).
/// `Malformed` means the backend answered but the payload failed validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Malformed(String),
}

impl BackendError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        BackendError::Unavailable(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        BackendError::Malformed(msg.into())
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Unavailable(format!("request timed out: {}", err))
        } else if err.is_decode() {
            BackendError::Malformed(format!("could not decode response: {}", err))
        } else {
            BackendError::Unavailable(format!("request failed: {}", err))
        }
    }
}
