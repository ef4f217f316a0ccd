//! Upload error types.

use std::path::PathBuf;

use stowage_shared::AppError;
use thiserror::Error;

use crate::storage::StorageError;

/// Upload operation errors.
#[derive(Debug, Error)]
pub enum UploadError {
    /// MIME type rejected by the uploader's allow-list.
    #[error("Files of type {mime_type} are not allowed.")]
    UnsupportedMediaType {
        /// The rejected MIME type.
        mime_type: String,
    },

    /// The requested transliteration ruleset does not exist.
    #[error("transliteration rules '{rules}' are not available")]
    TransliterationUnavailable {
        /// Requested ruleset name.
        rules: String,
    },

    /// Source file for an upload from disk could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Source {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// No uploader is registered under this name.
    #[error("unknown uploader: {0}")]
    UnknownUploader(String),

    /// Two uploaders were configured under the same name.
    #[error("uploader '{0}' is configured more than once")]
    DuplicateUploader(String),

    /// Storage backend failure, passed through unchanged.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl UploadError {
    /// Create an unsupported media type error.
    #[must_use]
    pub fn unsupported_media_type(mime_type: impl Into<String>) -> Self {
        Self::UnsupportedMediaType {
            mime_type: mime_type.into(),
        }
    }

    /// Create a transliteration unavailable error.
    #[must_use]
    pub fn transliteration_unavailable(rules: impl Into<String>) -> Self {
        Self::TransliterationUnavailable {
            rules: rules.into(),
        }
    }

    /// Create a source read error.
    #[must_use]
    pub fn unreadable_source(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Source {
            path: path.into(),
            source,
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        let message = err.to_string();
        match err {
            UploadError::UnsupportedMediaType { .. } => Self::Validation(message),
            UploadError::UnknownUploader(_) => Self::NotFound(message),
            UploadError::Source { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                Self::NotFound(message)
            }
            UploadError::Source { .. } => Self::Storage(message),
            UploadError::TransliterationUnavailable { .. } | UploadError::DuplicateUploader(_) => {
                Self::Configuration(message)
            }
            UploadError::Storage(StorageError::Configuration(_)) => Self::Configuration(message),
            UploadError::Storage(StorageError::InvalidKey(_)) => Self::Validation(message),
            UploadError::Storage(StorageError::NotFound(_)) => Self::NotFound(message),
            UploadError::Storage(StorageError::Operation(_)) => Self::Storage(message),
        }
    }
}
