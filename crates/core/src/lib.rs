//! Core upload logic for Stowage.
//!
//! This crate contains the storage-agnostic upload workflow and the storage
//! adapters it runs on. It has no CLI or HTTP dependencies.
//!
//! # Modules
//!
//! - `storage` - Local filesystem and S3-compatible storage adapters
//! - `upload` - Validation, filename sanitization and the upload service

pub mod storage;
pub mod upload;
