//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "stowage")]
#[command(about = "Upload, list and remove files through configured uploaders")]
#[command(version)]
pub struct Cli {
    /// Configuration file; `config/default` and `config/{RUN_MODE}` otherwise
    #[arg(long, global = true, env = "STOWAGE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List configured uploaders and their adapters
    Uploaders,
    /// Upload a file from disk under a generated name
    Upload {
        /// Uploader name
        uploader: String,
        /// File to upload
        file: PathBuf,
        /// Keep the source file after a successful upload
        #[arg(long)]
        keep: bool,
    },
    /// Upload a file with an explicit MIME type
    Put {
        /// Uploader name
        uploader: String,
        /// File to upload
        file: PathBuf,
        /// MIME type checked against the allow-list
        #[arg(long)]
        mime_type: String,
        /// Store under this exact key instead of a generated name
        #[arg(long, conflicts_with = "name")]
        key: Option<String>,
        /// Original filename used to generate the key (defaults to the file's name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Remove a stored file
    Remove {
        /// Uploader name
        uploader: String,
        /// Storage key
        key: String,
    },
    /// Print the public URL of a key
    Url {
        /// Uploader name
        uploader: String,
        /// Storage key
        key: String,
    },
    /// List public URLs of stored files
    List {
        /// Uploader name
        uploader: String,
        /// Print a JSON array instead of one URL per line
        #[arg(long)]
        json: bool,
    },
    /// Print the name a file would be stored under
    Name {
        /// Original filename
        original: String,
        /// Transliteration ruleset
        #[arg(long, default_value = "unicode")]
        rules: String,
    },
}
