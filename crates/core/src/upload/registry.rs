//! Named uploaders built from configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use stowage_shared::UploadersSettings;
use tracing::info;

use super::error::UploadError;
use super::service::UploadService;
use super::types::UploaderConfig;
use crate::storage::{Adapter, StorageBackend, StorageProvider};

/// Every configured uploader, addressable by name.
#[derive(Debug, Default)]
pub struct UploaderRegistry {
    uploaders: BTreeMap<String, UploadService<Adapter>>,
}

impl UploaderRegistry {
    /// Build one upload service per configured uploader.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A name is used by both a local and an S3 uploader
    /// - An adapter cannot be initialized
    /// - A transliteration ruleset is unknown
    pub fn from_settings(settings: &UploadersSettings) -> Result<Self, UploadError> {
        let mut registry = Self::default();

        for (name, local) in &settings.local {
            let config = UploaderConfig::new(local.path.clone())
                .with_allowed_types(local.allowed_types.iter().cloned())
                .with_transliteration(local.transliteration.clone());
            registry.insert(name, &StorageProvider::from(local), config)?;
        }

        for (name, s3) in &settings.aws_s3 {
            let config = UploaderConfig::new(s3.path.clone())
                .with_allowed_types(s3.allowed_types.iter().cloned())
                .with_transliteration(s3.transliteration.clone());
            registry.insert(name, &StorageProvider::from(s3), config)?;
        }

        Ok(registry)
    }

    fn insert(
        &mut self,
        name: &str,
        provider: &StorageProvider,
        config: UploaderConfig,
    ) -> Result<(), UploadError> {
        if self.uploaders.contains_key(name) {
            return Err(UploadError::DuplicateUploader(name.to_string()));
        }

        let adapter = Adapter::from_provider(provider)?;
        let service = UploadService::new(Arc::new(adapter), config)?;
        info!(
            uploader = %name,
            provider = provider.name(),
            adapter = %service.backend().kind(),
            bucket = %provider.bucket(),
            "uploader configured"
        );
        self.uploaders.insert(name.to_string(), service);
        Ok(())
    }

    /// Look up an uploader.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&UploadService<Adapter>> {
        self.uploaders.get(name)
    }

    /// Look up an uploader, failing for unknown names.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::UnknownUploader`] when no uploader has this name.
    pub fn require(&self, name: &str) -> Result<&UploadService<Adapter>, UploadError> {
        self.get(name)
            .ok_or_else(|| UploadError::UnknownUploader(name.to_string()))
    }

    /// Configured uploader names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.uploaders.keys().map(String::as_str)
    }

    /// Iterate over `(name, service)` pairs, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &UploadService<Adapter>)> {
        self.uploaders
            .iter()
            .map(|(name, service)| (name.as_str(), service))
    }

    /// Number of uploaders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.uploaders.len()
    }

    /// Whether no uploader is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.uploaders.is_empty()
    }
}
