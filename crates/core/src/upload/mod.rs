//! Upload service for client and server-side files.
//!
//! This module provides the storage-agnostic upload workflow:
//! - MIME type allow-list validation
//! - Filename sanitization and unique naming
//! - Uploads from client requests, local paths and raw content
//! - Public URL composition and file listing
//! - Named uploaders built from configuration

mod error;
mod registry;
mod sanitize;
mod service;
mod types;

#[cfg(test)]
mod sanitize_props;
#[cfg(test)]
mod service_props;
#[cfg(test)]
mod test_support;

pub use error::UploadError;
pub use registry::UploaderRegistry;
pub use sanitize::{FilenameSanitizer, TransliterationRules};
pub use service::UploadService;
pub use types::{OCTET_STREAM, StoredObject, UploadRequest, UploaderConfig, detect_mime_type};
