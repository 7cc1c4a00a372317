//! Error types for DocAuditor.
//!
//! Library crates use [`AuditError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all DocAuditor operations.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure: server unreachable, connection refused,
    /// request could not be sent or the body could not be read.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success HTTP status.
    #[error("server returned HTTP {status}")]
    Server { status: u16 },

    /// The response body decoded but lacks a required field.
    #[error("invalid response from server: {message}")]
    InvalidResponse { message: String },

    /// Session/key-value persistence error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (unknown scenario id, invalid format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// An orchestrator operation was invoked while a previous call under
    /// the same busy flag was still in flight.
    #[error("operation already in flight: {operation}")]
    Busy { operation: &'static str },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AuditError>;

impl AuditError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an invalid-response error from any displayable message.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
