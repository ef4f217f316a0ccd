//! Upload service implementation.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::UploadError;
use super::sanitize::FilenameSanitizer;
use super::types::{StoredObject, UploadRequest, UploaderConfig, detect_mime_type};
use crate::storage::{ObjectMetadata, StorageBackend};

/// Validates, names and stores files through one storage backend.
#[derive(Debug)]
pub struct UploadService<B: StorageBackend> {
    backend: Arc<B>,
    config: UploaderConfig,
    sanitizer: FilenameSanitizer,
}

impl<B: StorageBackend> UploadService<B> {
    /// Create a new upload service.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::TransliterationUnavailable`] if the configured
    /// ruleset is unknown.
    pub fn new(backend: Arc<B>, config: UploaderConfig) -> Result<Self, UploadError> {
        let sanitizer = FilenameSanitizer::new(&config.transliteration)?;
        debug!(
            adapter = %backend.kind(),
            rules = %sanitizer.rules(),
            allowed_types = config.allowed_types.len(),
            "upload service ready"
        );
        Ok(Self {
            backend,
            config,
            sanitizer,
        })
    }

    /// Store a client upload under a freshly generated name.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - MIME type is not allowed (nothing is written)
    /// - Storage backend fails
    pub async fn upload(&self, request: UploadRequest) -> Result<StoredObject, UploadError> {
        self.validate_mime_type(&request.mime_type)?;
        let key = self.generate_name(&request.original_name);
        self.store(key, request.content, request.mime_type).await
    }

    /// Store a file from disk, named after its basename.
    ///
    /// The MIME type is detected from the content. With `unlink_after_upload`
    /// the source is removed once stored; a failed removal is only logged.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Source file cannot be read
    /// - Detected MIME type is not allowed
    /// - Storage backend fails
    pub async fn upload_from_path(
        &self,
        path: impl AsRef<Path>,
        unlink_after_upload: bool,
    ) -> Result<StoredObject, UploadError> {
        let path = path.as_ref();
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| UploadError::unreadable_source(path, e))?;
        let mime_type = detect_mime_type(path, &content);
        let original_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let stored = self
            .upload(UploadRequest::new(content, original_name, mime_type))
            .await?;

        if unlink_after_upload {
            match tokio::fs::remove_file(path).await {
                Ok(()) => debug!(path = ?path, "source removed"),
                Err(e) => warn!(path = ?path, error = %e, "failed to remove uploaded source"),
            }
        }

        Ok(stored)
    }

    /// Store content under a caller-chosen key.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - MIME type is not allowed (nothing is written)
    /// - Key is not a valid relative storage key
    /// - Storage backend fails
    pub async fn upload_from_content(
        &self,
        content: impl Into<Vec<u8>>,
        key: &str,
        mime_type: &str,
    ) -> Result<StoredObject, UploadError> {
        self.validate_mime_type(mime_type)?;
        self.store(key.to_string(), content.into(), mime_type.to_string())
            .await
    }

    /// Delete a stored file; `false` when it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub async fn remove(&self, key: &str) -> Result<bool, UploadError> {
        let removed = self.backend.delete(key).await?;
        info!(key = %key, removed, adapter = %self.backend.kind(), "remove");
        Ok(removed)
    }

    /// Public URL of a stored file.
    #[must_use]
    pub fn get_url(&self, key: &str) -> String {
        self.backend
            .native_url(key)
            .unwrap_or_else(|| format!("{}{}", self.config.path, key))
    }

    /// Public URLs of every stored file.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be listed.
    pub async fn list_files(&self) -> Result<Vec<String>, UploadError> {
        let listing = self.backend.list_keys().await?;
        Ok(listing
            .into_file_names()
            .iter()
            .map(|name| self.get_url(name))
            .collect())
    }

    /// `{unique_token}-{sanitized_name}` for an original filename.
    #[must_use]
    pub fn generate_name(&self, original_name: &str) -> String {
        self.sanitizer.generate_name(original_name)
    }

    /// Uploader configuration.
    #[must_use]
    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Sanitizer generating storage names.
    #[must_use]
    pub fn sanitizer(&self) -> &FilenameSanitizer {
        &self.sanitizer
    }

    /// Accepted MIME types; empty accepts everything.
    #[must_use]
    pub fn allowed_types(&self) -> &[String] {
        &self.config.allowed_types
    }

    /// URL prefix.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.config.path
    }

    /// Storage backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    fn validate_mime_type(&self, mime_type: &str) -> Result<(), UploadError> {
        if self.config.is_mime_type_allowed(mime_type) {
            Ok(())
        } else {
            debug!(mime_type = %mime_type, "rejected by allow-list");
            Err(UploadError::unsupported_media_type(mime_type))
        }
    }

    async fn store(
        &self,
        key: String,
        content: Vec<u8>,
        mime_type: String,
    ) -> Result<StoredObject, UploadError> {
        let size = content.len() as u64;
        let metadata = self
            .backend
            .supports_metadata()
            .then(|| ObjectMetadata::with_content_type(mime_type.as_str()));

        self.backend
            .write(&key, content, metadata.as_ref())
            .await?;

        info!(
            key = %key,
            size,
            content_type = %mime_type,
            adapter = %self.backend.kind(),
            "upload stored"
        );
        Ok(StoredObject {
            key,
            content_type: mime_type,
            size,
        })
    }
}
