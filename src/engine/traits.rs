//! Traits for the external fetch engine and metadata provider

use crate::progress::RawProgress;
use crate::types::{FetchSpec, Suggestion, TrackMetadata};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Retrieves a source and transcodes it into an audio file on disk
///
/// Implementations report progress by sending [`RawProgress`] events on the
/// supplied channel, in the order they happen. The channel is closed when
/// the implementation drops its sender, which must happen no later than
/// when `fetch` returns.
#[async_trait]
pub trait FetchEngine: Send + Sync {
    /// Fetch `spec` into `output_dir` and return the produced file's path
    ///
    /// # Errors
    ///
    /// Any error is terminal for the job that called it; its message becomes
    /// the job's `error` text. Partial files are left where they are.
    async fn fetch(
        &self,
        spec: &FetchSpec,
        output_dir: &Path,
        progress: mpsc::Sender<RawProgress>,
    ) -> crate::Result<PathBuf>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Resolves free text or URLs to track metadata
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Resolve a query or URL to the best matching track
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ResolutionError::NotFound`] when nothing
    /// matches and [`crate::error::ResolutionError::Failed`] when the
    /// provider itself fails.
    async fn resolve(&self, query: &str) -> crate::Result<TrackMetadata>;

    /// Return up to `limit` raw candidates for a query, unfiltered
    async fn search(&self, query: &str, limit: usize) -> crate::Result<Vec<Suggestion>>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
