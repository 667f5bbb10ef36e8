//! Stub backend used when yt-dlp is not installed

use super::traits::{FetchEngine, MetadataProvider};
use crate::error::ResolutionError;
use crate::progress::RawProgress;
use crate::types::{FetchSpec, Suggestion, TrackMetadata};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

const MISSING_BINARY: &str =
    "yt-dlp binary not found. Configure engine.binary_path or ensure yt-dlp is in PATH.";

/// Backend that fails every operation
///
/// Lets the server run without the engine: fetch jobs end in the `error`
/// state, resolve reports a failure and suggestions degrade to an empty list.
///
/// # Examples
///
/// ```
/// use tunefetch::engine::{MetadataProvider, UnavailableEngine};
///
/// # #[tokio::main]
/// # async fn main() {
/// let result = UnavailableEngine.resolve("anything").await;
/// assert!(result.is_err());
/// # }
/// ```
pub struct UnavailableEngine;

#[async_trait]
impl FetchEngine for UnavailableEngine {
    async fn fetch(
        &self,
        _spec: &FetchSpec,
        _output_dir: &Path,
        _progress: mpsc::Sender<RawProgress>,
    ) -> crate::Result<PathBuf> {
        Err(crate::Error::ExternalTool(MISSING_BINARY.into()))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

#[async_trait]
impl MetadataProvider for UnavailableEngine {
    async fn resolve(&self, _query: &str) -> crate::Result<TrackMetadata> {
        Err(ResolutionError::Failed {
            reason: MISSING_BINARY.into(),
        }
        .into())
    }

    async fn search(&self, _query: &str, _limit: usize) -> crate::Result<Vec<Suggestion>> {
        Err(crate::Error::ExternalTool(MISSING_BINARY.into()))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}
