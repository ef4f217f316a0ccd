//! Subcommand execution against the uploader registry.

use std::io::Write;
use std::path::Path;

use stowage_core::storage::StorageBackend;
use stowage_core::upload::{FilenameSanitizer, UploadRequest, UploaderRegistry};
use stowage_shared::{AppError, AppResult};
use tracing::debug;

use crate::cli::Command;

/// Run one subcommand, writing its result to `out`.
pub async fn execute(
    command: Command,
    registry: &UploaderRegistry,
    out: &mut impl Write,
) -> AppResult<()> {
    match command {
        Command::Uploaders => {
            for (name, service) in registry.iter() {
                emit(out, format_args!("{name}\t{}", service.backend().kind()))?;
            }
        }
        Command::Upload {
            uploader,
            file,
            keep,
        } => {
            let service = registry.require(&uploader)?;
            let stored = service.upload_from_path(&file, !keep).await?;
            emit(out, format_args!("{}", stored.key))?;
        }
        Command::Put {
            uploader,
            file,
            mime_type,
            key,
            name,
        } => {
            let service = registry.require(&uploader)?;
            let content = read_source(&file).await?;
            let stored = match key {
                Some(key) => {
                    service
                        .upload_from_content(content, &key, &mime_type)
                        .await?
                }
                None => {
                    let original_name = name.unwrap_or_else(|| file_name(&file));
                    service
                        .upload(UploadRequest::new(content, original_name, mime_type))
                        .await?
                }
            };
            emit(out, format_args!("{}", stored.key))?;
        }
        Command::Remove { uploader, key } => {
            let removed = registry.require(&uploader)?.remove(&key).await?;
            emit(out, format_args!("{removed}"))?;
        }
        Command::Url { uploader, key } => {
            let url = registry.require(&uploader)?.get_url(&key);
            emit(out, format_args!("{url}"))?;
        }
        Command::List { uploader, json } => {
            let urls = registry.require(&uploader)?.list_files().await?;
            if json {
                let body = serde_json::to_string(&urls)
                    .map_err(|e| AppError::Internal(e.to_string()))?;
                emit(out, format_args!("{body}"))?;
            } else {
                for url in urls {
                    emit(out, format_args!("{url}"))?;
                }
            }
        }
        Command::Name { original, rules } => {
            let sanitizer = FilenameSanitizer::new(&rules)?;
            emit(out, format_args!("{}", sanitizer.generate_name(&original)))?;
        }
    }
    Ok(())
}

async fn read_source(path: &Path) -> AppResult<Vec<u8>> {
    debug!(path = ?path, "reading source");
    tokio::fs::read(path).await.map_err(|e| {
        let message = format!("cannot read {}: {e}", path.display());
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound(message)
        } else {
            AppError::Storage(message)
        }
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn emit(out: &mut impl Write, line: std::fmt::Arguments<'_>) -> AppResult<()> {
    writeln!(out, "{line}").map_err(|e| AppError::Internal(e.to_string()))
}
