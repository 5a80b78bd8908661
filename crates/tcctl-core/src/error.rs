//! Unified error handling for tcctl-core
//!
//! Service-reported failures (an `ErrorResult` body) are *not* errors at this
//! level; they come back as [`crate::Operation::Failed`] so the command layer
//! can render them. Everything here is a failure of the client itself.
//!
//! # Example
//!
//! ```rust
//! use tcctl_core::CoreError;
//!
//! let err = CoreError::Http { status: 503, message: "busy".to_string() };
//! assert!(err.is_retryable());
//! assert!(!err.is_not_found());
//! ```

use std::time::Duration;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Unexpected HTTP status without a decodable error document
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response
    #[error("Connection error: {0}")]
    Connection(String),

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The service answered outside the operation protocol
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Polling deadline elapsed before a terminal state
    #[error("Operation timed out after {0:?}")]
    PollTimeout(Duration),

    /// Polling iteration ceiling reached before a terminal state
    #[error("Operation still running after {0} status checks")]
    PollLimitExceeded(u32),

    /// Polling was cancelled by the caller
    #[error("Operation cancelled")]
    Cancelled,

    /// Invalid user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::Http { status: 404, .. })
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CoreError::Http { status: 401 | 403, .. })
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, CoreError::Http { status, .. } if *status >= 500)
    }

    /// Returns true if this is a timeout error
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, CoreError::PollTimeout(_))
    }

    /// Returns true if this is a bad request error (400)
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            CoreError::Http { status: 400, .. } | CoreError::Validation(_)
        )
    }

    /// Returns true if re-issuing the same idempotent request may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Connection(_) => true,
            CoreError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return CoreError::Decode(err.to_string());
        }
        match err.status() {
            Some(status) => CoreError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => CoreError::Connection(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Decode(err.to_string())
    }
}
