//! Shared configuration and error taxonomy for Stowage.
//!
//! This crate provides the pieces every other crate agrees on:
//! - Application configuration (logging and named uploaders)
//! - Application-wide error classification with exit codes

pub mod config;
pub mod error;

pub use config::{
    AppConfig, LocalUploaderSettings, LoggingConfig, S3UploaderSettings, UploadersSettings,
};
pub use error::{AppError, AppResult};
