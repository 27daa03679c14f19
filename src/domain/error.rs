//! Domain-level error types for quote-keeper.
//!
//! All errors are typed with `thiserror`. Validation and parse errors carry
//! the exact message shown to the user.

use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// User input rejected before any state change.
    #[error("{message}")]
    Validation { message: String },

    /// Failed to open or query the key/value database.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A persisted value exists but cannot be decoded.
    #[error("Corrupt stored value under '{key}': {message}")]
    CorruptState { key: String, message: String },

    /// An in-memory value could not be encoded for storage or output.
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Remote endpoint could not be reached or returned an unusable body.
    #[error("Remote error: {message}")]
    Remote {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// A sync tick was requested while another one is still fetching.
    #[error("Sync already in progress")]
    SyncBusy,

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create a validation error with a user-facing message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a database error from rusqlite error.
    pub fn database(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Create a serialization error for a value being written out.
    pub fn serialization(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a remote error from a reqwest failure.
    pub fn http(err: reqwest::Error) -> Self {
        Self::Remote {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Whether this error should be shown to the user as a plain alert.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
