//! Property-based tests for UploadService.
//!
//! These tests check the upload workflow against the in-memory backend:
//! rejected types never reach storage and listings track uploads and removals.

use std::sync::Arc;

use proptest::prelude::*;

use super::error::UploadError;
use super::service::UploadService;
use super::test_support::RecordingBackend;
use super::types::{UploadRequest, UploaderConfig};

const ALLOWED: [&str; 3] = ["image/png", "image/jpeg", "application/pdf"];

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
}

fn arb_backend() -> impl Strategy<Value = RecordingBackend> {
    any::<bool>().prop_map(|local| {
        if local {
            RecordingBackend::local()
        } else {
            RecordingBackend::object_store(None)
        }
    })
}

/// MIME types outside the allow-list, including the empty string.
fn arb_rejected_mime() -> impl Strategy<Value = String> {
    "([a-z]{1,10}/[a-z0-9.+-]{1,15})?"
        .prop_filter("must not be allowed", |m| !ALLOWED.contains(&m.as_str()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A rejected MIME type never causes a write.
    #[test]
    fn prop_rejected_mime_writes_nothing(
        backend in arb_backend(),
        mime_type in arb_rejected_mime(),
        name in "[a-zA-Z0-9 ._-]{1,20}",
    ) {
        let svc = UploadService::new(
            Arc::new(backend),
            UploaderConfig::new("/u/").with_allowed_types(ALLOWED),
        )
        .expect("service");

        let rt = runtime();
        let from_request = rt.block_on(svc.upload(UploadRequest::new(b"x".to_vec(), name.as_str(), mime_type.as_str())));
        let from_content = rt.block_on(svc.upload_from_content(b"x".to_vec(), "fixed.bin", &mime_type));

        let rejected = |result: &Result<_, UploadError>| {
            matches!(result, Err(UploadError::UnsupportedMediaType { mime_type: m }) if *m == mime_type)
        };
        prop_assert!(rejected(&from_request));
        prop_assert!(rejected(&from_content));
        prop_assert_eq!(svc.backend().write_count(), 0);
    }

    /// After N uploads and M removals, N - M files are listed.
    #[test]
    fn prop_listing_tracks_uploads_and_removals(
        backend in arb_backend(),
        names in prop::collection::vec("[a-z]{1,8}\\.png", 1..12),
        remove_count in 0usize..12,
    ) {
        let svc = UploadService::new(Arc::new(backend), UploaderConfig::new("/u/"))
            .expect("service");
        let rt = runtime();

        let mut keys = Vec::new();
        for name in &names {
            let stored = rt
                .block_on(svc.upload(UploadRequest::new(b"png".to_vec(), name.as_str(), "image/png")))
                .expect("upload");
            keys.push(stored.key);
        }

        let to_remove = remove_count.min(keys.len());
        for key in &keys[..to_remove] {
            prop_assert!(rt.block_on(svc.remove(key)).expect("remove"));
        }

        let listed = rt.block_on(svc.list_files()).expect("list");
        prop_assert_eq!(listed.len(), names.len() - to_remove);
        for key in &keys[to_remove..] {
            let url = svc.get_url(key);
            prop_assert!(listed.contains(&url));
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Removing the same key twice reports absence the second time.
    #[tokio::test]
    async fn test_double_remove() {
        let svc = UploadService::new(Arc::new(RecordingBackend::local()), UploaderConfig::new("/u/"))
            .expect("service");
        let stored = svc
            .upload(UploadRequest::new(b"x".to_vec(), "x.png", "image/png"))
            .await
            .expect("upload");

        assert!(svc.remove(&stored.key).await.expect("first remove"));
        assert!(!svc.remove(&stored.key).await.expect("second remove"));
        assert!(svc.list_files().await.expect("list").is_empty());
    }
}
