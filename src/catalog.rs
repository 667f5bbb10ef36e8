//! Catalog of produced artifacts
//!
//! The storage directory is the only state: every call rescans it, so files
//! added or removed behind the service's back show up on the next listing.

use crate::error::{CatalogError, Result};
use crate::types::{CatalogEntry, Codec};
use crate::utils::{human_size, is_plain_filename};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Scanner over the flat artifact directory
#[derive(Clone, Debug)]
pub struct Catalog {
    dir: PathBuf,
}

impl Catalog {
    /// Create a catalog over `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory being scanned
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List audio artifacts, most recently modified first
    ///
    /// A missing storage directory lists as empty.
    pub async fn list(&self) -> Result<Vec<CatalogEntry>> {
        let mut read_dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        while let Some(dir_entry) = read_dir.next_entry().await? {
            let path = dir_entry.path();
            let Some(codec) = audio_codec(&path) else {
                continue;
            };

            let metadata = match dir_entry.metadata().await {
                Ok(metadata) if metadata.is_file() => metadata,
                Ok(_) => continue,
                Err(e) => {
                    // Removed between read_dir and stat
                    tracing::debug!(path = %path.display(), error = %e, "Skipping unreadable catalog entry");
                    continue;
                }
            };

            let modified = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0);

            entries.push(CatalogEntry {
                filename: dir_entry.file_name().to_string_lossy().into_owned(),
                title: path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                size: metadata.len(),
                size_human: human_size(metadata.len()),
                modified,
                codec,
            });
        }

        entries.sort_by(|a, b| b.modified.total_cmp(&a.modified));
        Ok(entries)
    }

    /// Locate a file for streaming, returning its path and content type
    pub async fn open(&self, filename: &str) -> Result<(PathBuf, &'static str)> {
        let path = self.existing_file(filename).await?;
        let mime = audio_codec(&path)
            .map(|codec| codec.mime_type())
            .unwrap_or(Codec::Mp3.mime_type());
        Ok((path, mime))
    }

    /// Delete a file; only `.mp3` artifacts may be deleted
    pub async fn delete(&self, filename: &str) -> Result<()> {
        let path = self.existing_file(filename).await?;

        let is_mp3 = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"));
        if !is_mp3 {
            return Err(CatalogError::NotDeletable {
                filename: filename.to_string(),
            }
            .into());
        }

        tokio::fs::remove_file(&path).await?;
        tracing::info!(filename = %filename, "Deleted catalog file");
        Ok(())
    }

    async fn existing_file(&self, filename: &str) -> Result<PathBuf> {
        if !is_plain_filename(filename) {
            return Err(CatalogError::InvalidName {
                filename: filename.to_string(),
            }
            .into());
        }

        let path = self.dir.join(filename);
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(path),
            _ => Err(CatalogError::NotFound {
                filename: filename.to_string(),
            }
            .into()),
        }
    }
}

fn audio_codec(path: &Path) -> Option<Codec> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(Codec::from_extension)
}
