//! Application configuration management.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Named uploaders, grouped by backend type.
    #[serde(default)]
    pub uploaders: UploadersSettings,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Uploader definitions keyed by uploader name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadersSettings {
    /// Uploaders writing to the local filesystem.
    #[serde(default)]
    pub local: BTreeMap<String, LocalUploaderSettings>,
    /// Uploaders writing to an S3-compatible bucket.
    #[serde(default)]
    pub aws_s3: BTreeMap<String, S3UploaderSettings>,
}

impl UploadersSettings {
    /// Total number of configured uploaders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.local.len() + self.aws_s3.len()
    }

    /// Whether no uploader is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.aws_s3.is_empty()
    }
}

/// Local filesystem uploader.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalUploaderSettings {
    /// Accepted MIME types; empty accepts everything.
    #[serde(default)]
    pub allowed_types: Vec<String>,
    /// Directory the files are written to.
    pub directory: PathBuf,
    /// Prefix used to compose public URLs.
    pub path: String,
    /// Create `directory` when it does not exist.
    #[serde(default)]
    pub create: bool,
    /// Transliteration ruleset for generated names.
    #[serde(default = "default_transliteration")]
    pub transliteration: String,
}

/// S3-compatible object storage uploader.
#[derive(Debug, Clone, Deserialize)]
pub struct S3UploaderSettings {
    /// Accepted MIME types; empty accepts everything.
    #[serde(default)]
    pub allowed_types: Vec<String>,
    /// Bucket name.
    pub bucket_name: String,
    /// Prefix used to compose public URLs.
    pub path: String,
    /// Bucket region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible services (MinIO, R2).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Access key ID; the default credential chain is used when absent.
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// Secret access key.
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Key prefix inside the bucket.
    #[serde(default)]
    pub directory: Option<String>,
    /// Base URL the bucket is publicly served from.
    #[serde(default)]
    pub public_url: Option<String>,
    /// Transliteration ruleset for generated names.
    #[serde(default = "default_transliteration")]
    pub transliteration: String,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_transliteration() -> String {
    "unicode".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones overriding earlier ones:
    /// `config/default`, `config/{RUN_MODE}`, `STOWAGE__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let files = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .build()?;

        Self::with_environment(files)
    }

    /// Loads configuration from an explicit file, still honoring environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let files = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?;

        Self::with_environment(files)
    }

    /// Layer `STOWAGE__*` variables over the file sources.
    ///
    /// `allowed_types` of uploaders declared in the files accept a
    /// comma-separated list, e.g.
    /// `STOWAGE__UPLOADERS__LOCAL__AVATARS__ALLOWED_TYPES=image/png,image/gif`.
    /// Uploaders declared only through the environment cannot set it.
    fn with_environment(files: config::Config) -> Result<Self, config::ConfigError> {
        let mut environment = config::Environment::with_prefix("STOWAGE")
            .separator("__")
            .try_parsing(true)
            .list_separator(",");
        for key in allowed_types_keys(&files) {
            environment = environment.with_list_parse_key(&key);
        }

        let config = config::Config::builder()
            .add_source(files)
            .add_source(environment)
            .build()?;

        config.try_deserialize()
    }
}

/// `uploaders.<section>.<name>.allowed_types` for every uploader in `files`.
fn allowed_types_keys(files: &config::Config) -> Vec<String> {
    ["local", "aws_s3"]
        .into_iter()
        .flat_map(|section| {
            files
                .get_table(&format!("uploaders.{section}"))
                .map(|uploaders| {
                    uploaders
                        .into_keys()
                        .map(|name| {
                            format!("uploaders.{section}.{}.allowed_types", name.to_lowercase())
                        })
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        })
        .collect()
}
