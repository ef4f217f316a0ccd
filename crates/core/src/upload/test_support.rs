//! In-memory backend recording every call, for upload service tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::storage::{AdapterKind, KeyListing, ObjectMetadata, StorageBackend, StorageError};

type Objects = BTreeMap<String, (Vec<u8>, Option<ObjectMetadata>)>;

/// Backend keeping objects in a map and counting writes.
#[derive(Debug)]
pub(crate) struct RecordingBackend {
    kind: AdapterKind,
    public_url: Option<String>,
    objects: Mutex<Objects>,
    writes: AtomicUsize,
    failure: Mutex<Option<String>>,
}

impl RecordingBackend {
    fn new(kind: AdapterKind, public_url: Option<&str>) -> Self {
        Self {
            kind,
            public_url: public_url.map(str::to_string),
            objects: Mutex::new(BTreeMap::new()),
            writes: AtomicUsize::new(0),
            failure: Mutex::new(None),
        }
    }

    /// Behaves like the local variant: nested listing, no metadata, no native URL.
    pub(crate) fn local() -> Self {
        Self::new(AdapterKind::Local, None)
    }

    /// Behaves like the object-store variant: flat listing, metadata, optional native URL.
    pub(crate) fn object_store(public_url: Option<&str>) -> Self {
        Self::new(AdapterKind::ObjectStore, public_url)
    }

    /// Make every subsequent operation fail.
    pub(crate) fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub(crate) fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub(crate) fn content(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(content, _)| content.clone())
    }

    pub(crate) fn metadata(&self, key: &str) -> Option<ObjectMetadata> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .and_then(|(_, metadata)| metadata.clone())
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    fn check(&self) -> Result<(), StorageError> {
        match self.failure.lock().unwrap().as_deref() {
            Some(message) => Err(StorageError::operation(message)),
            None => Ok(()),
        }
    }
}

impl StorageBackend for RecordingBackend {
    fn kind(&self) -> AdapterKind {
        self.kind
    }

    fn supports_metadata(&self) -> bool {
        self.kind == AdapterKind::ObjectStore
    }

    async fn write(
        &self,
        key: &str,
        content: Vec<u8>,
        metadata: Option<&ObjectMetadata>,
    ) -> Result<(), StorageError> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (content, metadata.cloned()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        self.check()?;
        Ok(self.objects.lock().unwrap().remove(key).is_some())
    }

    async fn list_keys(&self) -> Result<KeyListing, StorageError> {
        self.check()?;
        let keys = self.keys();
        Ok(match self.kind {
            AdapterKind::Local => KeyListing::Nested {
                keys,
                dirs: Vec::new(),
            },
            AdapterKind::ObjectStore => KeyListing::Flat { keys, prefix: None },
        })
    }

    fn native_url(&self, key: &str) -> Option<String> {
        self.public_url
            .as_ref()
            .map(|base| format!("{}/{key}", base.trim_end_matches('/')))
    }
}
