//! Storage adapters built on Apache OpenDAL.
//!
//! Two variants sit behind the [`StorageBackend`] capability trait:
//!
//! | Variant       | Listing shape          | Native URL          | Metadata      |
//! |---------------|------------------------|---------------------|---------------|
//! | `Local`       | nested keys + dirs     | never               | ignored       |
//! | `ObjectStore` | flat, fully-qualified  | with `public_url`   | content type  |
//!
//! The variant is fixed when the adapter is built from a [`StorageProvider`].

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::{Component, Path, PathBuf};

use opendal::{ErrorKind, Operator, services};
use tracing::debug;

use super::config::StorageProvider;
use super::error::StorageError;

/// Metadata entry holding the object's MIME type.
pub const CONTENT_TYPE: &str = "contentType";

/// Which adapter variant is serving an uploader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    /// Local filesystem.
    Local,
    /// S3-compatible object store.
    ObjectStore,
}

impl AdapterKind {
    /// Short name used in logs and CLI output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::ObjectStore => "object_store",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata attached to an object at write time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata(HashMap<String, String>);

impl ObjectMetadata {
    /// Metadata carrying only a content type.
    #[must_use]
    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        let mut metadata = Self::default();
        metadata.insert(CONTENT_TYPE, content_type);
        metadata
    }

    /// Set an entry, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Look up an entry.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// The content type entry, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.get(CONTENT_TYPE)
    }
}

/// Result of listing an adapter's keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyListing {
    /// Relative file paths plus the directories containing them.
    Nested {
        /// File keys relative to the adapter root.
        keys: Vec<String>,
        /// Directory paths relative to the adapter root.
        dirs: Vec<String>,
    },
    /// Fully-qualified object keys, directory prefix included.
    Flat {
        /// Object keys as stored in the bucket.
        keys: Vec<String>,
        /// Bucket directory every key is qualified with.
        prefix: Option<String>,
    },
}

impl KeyListing {
    /// Normalize the listing into the names an uploader addresses files by.
    ///
    /// Nested keys are used as-is. Flat keys lose the bucket directory
    /// prefix, keeping any sub-path of their own; directory markers are skipped.
    #[must_use]
    pub fn into_file_names(self) -> Vec<String> {
        match self {
            Self::Nested { keys, .. } => keys,
            Self::Flat { keys, prefix } => keys
                .iter()
                .filter_map(|key| unqualified(key, prefix.as_deref()))
                .map(str::to_string)
                .collect(),
        }
    }

    /// Number of entries that name a file.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Nested { keys, .. } | Self::Flat { keys, .. } => keys.len(),
        }
    }

    /// Whether the listing names no file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn unqualified<'a>(key: &'a str, prefix: Option<&str>) -> Option<&'a str> {
    let relative = prefix
        .and_then(|prefix| key.strip_prefix(prefix))
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(key);
    Some(relative).filter(|name| !name.is_empty() && !name.ends_with('/'))
}

/// Capabilities every storage backend offers to the upload service.
pub trait StorageBackend: Send + Sync {
    /// Which variant this backend is.
    fn kind(&self) -> AdapterKind;

    /// Whether metadata passed to [`write`](Self::write) is persisted.
    fn supports_metadata(&self) -> bool;

    /// Store `content` under `key`, overwriting any existing object.
    fn write(
        &self,
        key: &str,
        content: Vec<u8>,
        metadata: Option<&ObjectMetadata>,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete the object at `key`; `false` when there was none.
    fn delete(&self, key: &str) -> impl Future<Output = Result<bool, StorageError>> + Send;

    /// Enumerate every stored key.
    fn list_keys(&self) -> impl Future<Output = Result<KeyListing, StorageError>> + Send;

    /// Backend-hosted public URL for `key`, when the backend serves one.
    fn native_url(&self, key: &str) -> Option<String>;
}

/// Reject keys that are empty, absolute, or escape the adapter root.
fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.ends_with('/') {
        return Err(StorageError::invalid_key(format!("'{key}' does not name a file")));
    }
    let escapes = Path::new(key).components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(StorageError::invalid_key(format!(
            "'{key}' must be relative to the storage root"
        )));
    }
    Ok(())
}

async fn object_exists(operator: &Operator, key: &str) -> Result<bool, StorageError> {
    match operator.stat(key).await {
        Ok(meta) => Ok(!meta.is_dir()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}

async fn delete_if_exists(operator: &Operator, key: &str) -> Result<bool, StorageError> {
    validate_key(key)?;
    if !object_exists(operator, key).await? {
        debug!(key = %key, "nothing to delete");
        return Ok(false);
    }
    operator.delete(key).await?;
    debug!(key = %key, "object deleted");
    Ok(true)
}

/// Walk the whole operator root, splitting files from directories.
async fn list_root(operator: &Operator) -> Result<(Vec<String>, Vec<String>), StorageError> {
    let entries = operator.list_with("/").recursive(true).await?;

    let mut keys = Vec::new();
    let mut dirs = Vec::new();
    for entry in entries {
        let path = entry.path();
        if path.is_empty() || path == "/" {
            continue;
        }
        if entry.metadata().is_dir() {
            dirs.push(path.trim_end_matches('/').to_string());
        } else {
            keys.push(path.to_string());
        }
    }
    keys.sort();
    dirs.sort();
    Ok((keys, dirs))
}

/// Local filesystem adapter.
pub struct LocalAdapter {
    operator: Operator,
    root: PathBuf,
}

impl LocalAdapter {
    /// Open a local adapter rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `root` is missing and `create` is
    /// false, or if it cannot be created.
    pub fn new(root: impl Into<PathBuf>, create: bool) -> Result<Self, StorageError> {
        let root = root.into();
        if !root.is_dir() {
            if !create {
                return Err(StorageError::configuration(format!(
                    "directory {} does not exist",
                    root.display()
                )));
            }
            std::fs::create_dir_all(&root).map_err(|e| {
                StorageError::configuration(format!(
                    "cannot create directory {}: {e}",
                    root.display()
                ))
            })?;
        }

        let builder = services::Fs::default().root(
            root.to_str()
                .ok_or_else(|| StorageError::configuration("invalid path"))?,
        );
        let operator = Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish();

        Ok(Self { operator, root })
    }

    /// Root directory of this adapter.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl StorageBackend for LocalAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Local
    }

    fn supports_metadata(&self) -> bool {
        false
    }

    async fn write(
        &self,
        key: &str,
        content: Vec<u8>,
        _metadata: Option<&ObjectMetadata>,
    ) -> Result<(), StorageError> {
        validate_key(key)?;
        let size = content.len();
        self.operator.write(key, content).await?;
        debug!(key = %key, root = ?self.root, size, "file written");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        delete_if_exists(&self.operator, key).await
    }

    async fn list_keys(&self) -> Result<KeyListing, StorageError> {
        let (keys, dirs) = list_root(&self.operator).await?;
        Ok(KeyListing::Nested { keys, dirs })
    }

    fn native_url(&self, _key: &str) -> Option<String> {
        None
    }
}

impl fmt::Debug for LocalAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalAdapter")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// S3-compatible object storage adapter.
pub struct ObjectStoreAdapter {
    operator: Operator,
    bucket: String,
    /// Key prefix inside the bucket, without surrounding slashes.
    directory: Option<String>,
    /// Base URL for public access (e.g., CloudFront distribution).
    public_url: Option<String>,
}

impl ObjectStoreAdapter {
    /// Wrap an already-built operator.
    ///
    /// The operator must already be rooted at `directory` when one is given;
    /// the directory is only used to qualify listed keys and native URLs.
    #[must_use]
    pub fn from_operator(
        operator: Operator,
        bucket: impl Into<String>,
        directory: Option<String>,
        public_url: Option<String>,
    ) -> Self {
        let directory = directory
            .map(|dir| dir.trim_matches('/').to_string())
            .filter(|dir| !dir.is_empty());
        Self {
            operator,
            bucket: bucket.into(),
            directory,
            public_url,
        }
    }

    /// Bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Key as stored in the bucket, directory prefix included.
    #[must_use]
    pub fn qualified_key(&self, key: &str) -> String {
        match &self.directory {
            Some(directory) => format!("{directory}/{key}"),
            None => key.to_string(),
        }
    }
}

impl StorageBackend for ObjectStoreAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::ObjectStore
    }

    fn supports_metadata(&self) -> bool {
        self.operator.info().full_capability().write_with_content_type
    }

    async fn write(
        &self,
        key: &str,
        content: Vec<u8>,
        metadata: Option<&ObjectMetadata>,
    ) -> Result<(), StorageError> {
        validate_key(key)?;
        let size = content.len();
        let content_type = metadata
            .and_then(ObjectMetadata::content_type)
            .filter(|_| self.supports_metadata());

        match content_type {
            Some(content_type) => {
                self.operator
                    .write_with(key, content)
                    .content_type(content_type)
                    .await?;
            }
            None => {
                self.operator.write(key, content).await?;
            }
        }

        debug!(
            key = %key,
            bucket = %self.bucket,
            size,
            content_type = content_type.unwrap_or_default(),
            "object written"
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        delete_if_exists(&self.operator, key).await
    }

    async fn list_keys(&self) -> Result<KeyListing, StorageError> {
        let (keys, _) = list_root(&self.operator).await?;
        Ok(KeyListing::Flat {
            keys: keys.iter().map(|key| self.qualified_key(key)).collect(),
            prefix: self.directory.clone(),
        })
    }

    fn native_url(&self, key: &str) -> Option<String> {
        self.public_url.as_ref().map(|base| {
            format!(
                "{}/{}",
                base.trim_end_matches('/'),
                self.qualified_key(key)
            )
        })
    }
}

impl fmt::Debug for ObjectStoreAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStoreAdapter")
            .field("bucket", &self.bucket)
            .field("directory", &self.directory)
            .field("public_url", &self.public_url)
            .finish_non_exhaustive()
    }
}

/// The adapter an uploader writes through, chosen once from configuration.
#[derive(Debug)]
pub enum Adapter {
    /// Local filesystem.
    Local(LocalAdapter),
    /// S3-compatible object store.
    ObjectStore(ObjectStoreAdapter),
}

impl Adapter {
    /// Build the adapter described by `provider`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_provider(provider: &StorageProvider) -> Result<Self, StorageError> {
        match provider {
            StorageProvider::LocalFs { root, create } => {
                LocalAdapter::new(root.clone(), *create).map(Self::Local)
            }
            StorageProvider::S3 {
                bucket,
                region,
                endpoint,
                access_key_id,
                secret_access_key,
                directory,
                public_url,
            } => {
                let mut builder = services::S3::default().bucket(bucket).region(region);
                if let Some(endpoint) = endpoint {
                    builder = builder.endpoint(endpoint);
                }
                if let Some(access_key_id) = access_key_id {
                    builder = builder.access_key_id(access_key_id);
                }
                if let Some(secret_access_key) = secret_access_key {
                    builder = builder.secret_access_key(secret_access_key);
                }
                if let Some(directory) = directory {
                    builder = builder.root(&format!("/{}", directory.trim_matches('/')));
                }

                let operator = Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish();

                Ok(Self::ObjectStore(ObjectStoreAdapter::from_operator(
                    operator,
                    bucket.clone(),
                    directory.clone(),
                    public_url.clone(),
                )))
            }
        }
    }
}

impl StorageBackend for Adapter {
    fn kind(&self) -> AdapterKind {
        match self {
            Self::Local(adapter) => adapter.kind(),
            Self::ObjectStore(adapter) => adapter.kind(),
        }
    }

    fn supports_metadata(&self) -> bool {
        match self {
            Self::Local(adapter) => adapter.supports_metadata(),
            Self::ObjectStore(adapter) => adapter.supports_metadata(),
        }
    }

    async fn write(
        &self,
        key: &str,
        content: Vec<u8>,
        metadata: Option<&ObjectMetadata>,
    ) -> Result<(), StorageError> {
        match self {
            Self::Local(adapter) => adapter.write(key, content, metadata).await,
            Self::ObjectStore(adapter) => adapter.write(key, content, metadata).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        match self {
            Self::Local(adapter) => adapter.delete(key).await,
            Self::ObjectStore(adapter) => adapter.delete(key).await,
        }
    }

    async fn list_keys(&self) -> Result<KeyListing, StorageError> {
        match self {
            Self::Local(adapter) => adapter.list_keys().await,
            Self::ObjectStore(adapter) => adapter.list_keys().await,
        }
    }

    fn native_url(&self, key: &str) -> Option<String> {
        match self {
            Self::Local(adapter) => adapter.native_url(key),
            Self::ObjectStore(adapter) => adapter.native_url(key),
        }
    }
}
