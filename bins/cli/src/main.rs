//! Stowage command line front end.
//!
//! Loads uploader configuration, then uploads, lists or removes files
//! through the named uploader.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use stowage_core::upload::UploaderRegistry;
use stowage_shared::{AppConfig, AppError, LoggingConfig};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .downcast_ref::<AppError>()
                .map_or(1, AppError::exit_code);
            error!(error = %err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .map_err(AppError::from)?;

    init_tracing(&config.logging);
    debug!(uploaders = config.uploaders.len(), "configuration loaded");

    let registry = UploaderRegistry::from_settings(&config.uploaders).map_err(AppError::from)?;

    let mut stdout = std::io::stdout().lock();
    commands::execute(cli.command, &registry, &mut stdout).await?;
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let (plain, json) = if logging.json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (Some(fmt::layer().with_writer(std::io::stderr)), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .init();
}
