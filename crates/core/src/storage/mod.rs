//! Storage adapters for uploaded files using Apache OpenDAL.
//!
//! This module provides vendor-agnostic object storage with support for:
//! - S3-compatible: AWS S3, MinIO, Cloudflare R2, DigitalOcean Spaces
//! - Local filesystem
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  StorageBackend (capabilities)                   │
//! │   write(key, bytes, metadata)   delete(key)   list_keys()        │
//! │   native_url(key)               supports_metadata()              │
//! ├────────────────────────────────┬────────────────────────────────┤
//! │ Adapter::Local                 │ Adapter::ObjectStore           │
//! │ opendal services::Fs           │ opendal services::S3           │
//! └────────────────────────────────┴────────────────────────────────┘
//! ```

mod adapter;
mod config;
mod error;

pub use adapter::{
    Adapter, AdapterKind, CONTENT_TYPE, KeyListing, LocalAdapter, ObjectMetadata,
    ObjectStoreAdapter, StorageBackend,
};
pub use config::StorageProvider;
pub use error::StorageError;
