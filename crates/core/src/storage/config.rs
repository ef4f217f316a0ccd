//! Storage configuration types.

use std::path::PathBuf;

use stowage_shared::{LocalUploaderSettings, S3UploaderSettings};

/// Storage provider configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageProvider {
    /// S3-compatible storage: AWS S3, MinIO, Cloudflare R2, DigitalOcean Spaces
    S3 {
        /// Bucket name.
        bucket: String,
        /// Bucket region.
        region: String,
        /// Custom endpoint URL for S3-compatible services.
        endpoint: Option<String>,
        /// Access key ID; default credential chain when absent.
        access_key_id: Option<String>,
        /// Secret access key.
        secret_access_key: Option<String>,
        /// Key prefix inside the bucket.
        directory: Option<String>,
        /// Base URL objects are publicly served from.
        public_url: Option<String>,
    },
    /// Local filesystem
    LocalFs {
        /// Root directory path.
        root: PathBuf,
        /// Create the root directory when missing.
        create: bool,
    },
}

impl StorageProvider {
    /// Create S3-compatible provider using the default credential chain.
    #[must_use]
    pub fn s3(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self::S3 {
            bucket: bucket.into(),
            region: region.into(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            directory: None,
            public_url: None,
        }
    }

    /// Create local filesystem provider.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>, create: bool) -> Self {
        Self::LocalFs {
            root: root.into(),
            create,
        }
    }

    /// Get the provider name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
        }
    }

    /// Get the bucket name, or the root directory for local storage.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } => bucket,
            Self::LocalFs { root, .. } => root.to_str().unwrap_or("local"),
        }
    }
}

impl From<&LocalUploaderSettings> for StorageProvider {
    fn from(settings: &LocalUploaderSettings) -> Self {
        Self::local_fs(settings.directory.clone(), settings.create)
    }
}

impl From<&S3UploaderSettings> for StorageProvider {
    fn from(settings: &S3UploaderSettings) -> Self {
        Self::S3 {
            bucket: settings.bucket_name.clone(),
            region: settings.region.clone(),
            endpoint: settings.endpoint.clone(),
            access_key_id: settings.access_key_id.clone(),
            secret_access_key: settings.secret_access_key.clone(),
            directory: settings.directory.clone(),
            public_url: settings.public_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_provider_s3() {
        let provider = StorageProvider::s3("attachments", "eu-west-1");
        assert_eq!(provider.name(), "s3");
        assert_eq!(provider.bucket(), "attachments");
    }

    #[test]
    fn test_storage_provider_local() {
        let provider = StorageProvider::local_fs("./storage", true);
        assert_eq!(provider.name(), "local");
        assert_eq!(provider.bucket(), "./storage");
    }

    #[test]
    fn test_provider_from_s3_settings() {
        let settings = S3UploaderSettings {
            allowed_types: vec![],
            bucket_name: "media".to_string(),
            path: "https://cdn.example.com/".to_string(),
            region: "auto".to_string(),
            endpoint: Some("http://localhost:9000".to_string()),
            access_key_id: Some("key".to_string()),
            secret_access_key: Some("secret".to_string()),
            directory: Some("uploads".to_string()),
            public_url: None,
            transliteration: "unicode".to_string(),
        };

        let StorageProvider::S3 {
            bucket,
            region,
            endpoint,
            directory,
            ..
        } = StorageProvider::from(&settings)
        else {
            panic!("expected S3 provider");
        };
        assert_eq!(bucket, "media");
        assert_eq!(region, "auto");
        assert_eq!(endpoint.as_deref(), Some("http://localhost:9000"));
        assert_eq!(directory.as_deref(), Some("uploads"));
    }

    #[test]
    fn test_provider_from_local_settings() {
        let settings = LocalUploaderSettings {
            allowed_types: vec!["image/png".to_string()],
            directory: PathBuf::from("/srv/uploads"),
            path: "/uploads/".to_string(),
            create: true,
            transliteration: "unicode".to_string(),
        };

        assert_eq!(
            StorageProvider::from(&settings),
            StorageProvider::local_fs("/srv/uploads", true)
        );
    }
}
