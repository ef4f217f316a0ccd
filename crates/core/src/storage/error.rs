//! Storage error types.

use thiserror::Error;

/// Errors raised by storage adapters.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The adapter cannot be built from its settings.
    #[error("storage misconfigured: {0}")]
    Configuration(String),

    /// Key is empty, names a directory, or leaves the adapter root.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Backend reported a missing object mid-operation.
    #[error("object not found: {0}")]
    NotFound(String),

    /// Network, permission or disk failure.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an invalid key error.
    #[must_use]
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKey(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        let message = err.to_string();
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound(message),
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(message),
            _ => Self::Operation(message),
        }
    }
}
