//! Upload types and data structures.

use std::path::Path;

/// Fallback when content sniffing and the extension both give nothing.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Settings of one named uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploaderConfig {
    /// Accepted MIME types; empty accepts everything.
    pub allowed_types: Vec<String>,
    /// Prefix used to compose public URLs.
    pub path: String,
    /// Transliteration ruleset for generated names.
    pub transliteration: String,
}

impl UploaderConfig {
    /// Create a config with the given URL prefix, no type restriction and
    /// the unicode ruleset.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            allowed_types: Vec::new(),
            path: path.into(),
            transliteration: "unicode".to_string(),
        }
    }

    /// Set allowed MIME types.
    #[must_use]
    pub fn with_allowed_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Set the transliteration ruleset.
    #[must_use]
    pub fn with_transliteration(mut self, rules: impl Into<String>) -> Self {
        self.transliteration = rules.into();
        self
    }

    /// Check if a MIME type is allowed.
    #[must_use]
    pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_types.is_empty() || self.allowed_types.iter().any(|t| t == mime_type)
    }
}

/// A file handed to the uploader.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Filename as supplied by the client.
    pub original_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// File content.
    pub content: Vec<u8>,
}

impl UploadRequest {
    /// Create a new upload request.
    #[must_use]
    pub fn new(
        content: impl Into<Vec<u8>>,
        original_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            mime_type: mime_type.into(),
            content: content.into(),
        }
    }
}

/// An object written by the uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Storage key.
    pub key: String,
    /// MIME type recorded at upload.
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
}

/// Detect the MIME type of a file from its content, falling back to its extension.
#[must_use]
pub fn detect_mime_type(path: &Path, content: &[u8]) -> String {
    if let Some(kind) = infer::get(content) {
        return kind.mime_type().to_string();
    }
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(OCTET_STREAM)
        .to_string()
}
