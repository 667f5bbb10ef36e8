//! Common utilities for tunefetch integration tests
//!
//! The engine and provider here stand in for `yt-dlp`: the engine writes a
//! small file into the output directory and reports progress the way the
//! real binary does, so the whole submit/poll/catalog cycle runs offline.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tunefetch::progress::{RawProgress, TotalSize};
use tunefetch::types::FetchSpec;
use tunefetch::{
    Config, Error, FetchEngine, JobId, JobRecord, MetadataProvider, ResolutionError, Result,
    Suggestion, TrackMetadata, TuneFetch,
};

/// Engine that writes `payload` to `<title>.<codec>`
pub struct LocalEngine {
    pub payload: Vec<u8>,
}

#[async_trait]
impl FetchEngine for LocalEngine {
    async fn fetch(
        &self,
        spec: &FetchSpec,
        output_dir: &Path,
        progress: mpsc::Sender<RawProgress>,
    ) -> Result<PathBuf> {
        if spec.locator.contains("unavailable") {
            return Err(Error::Engine("Video unavailable".to_string()));
        }

        let total = self.payload.len() as u64;
        for downloaded in [total / 2, total] {
            let _ = progress
                .send(RawProgress::Downloading {
                    downloaded_bytes: Some(downloaded),
                    total: TotalSize::Known(total),
                })
                .await;
        }
        let _ = progress.send(RawProgress::Finished).await;

        let path = output_dir.join(format!("{}.{}", spec.title, spec.codec.as_str()));
        tokio::fs::write(&path, &self.payload).await?;
        Ok(path)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Provider backed by a fixed candidate list
pub struct FixedProvider {
    pub candidates: Vec<Suggestion>,
}

#[async_trait]
impl MetadataProvider for FixedProvider {
    async fn resolve(&self, query: &str) -> Result<TrackMetadata> {
        let needle = query.to_lowercase();
        self.candidates
            .iter()
            .find(|c| c.title.to_lowercase().contains(&needle))
            .map(|c| TrackMetadata {
                title: c.title.clone(),
                artist: c.artist.clone(),
                album: None,
                duration: c.duration,
                url: c.url.clone(),
                thumbnail: c.thumbnail.clone(),
            })
            .ok_or_else(|| {
                Error::Resolution(ResolutionError::NotFound {
                    query: query.to_string(),
                })
            })
    }

    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<Suggestion>> {
        Ok(self.candidates.iter().take(limit).cloned().collect())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

pub fn suggestion(title: &str, duration: u64) -> Suggestion {
    Suggestion {
        title: title.to_string(),
        artist: "Test Artist".to_string(),
        duration,
        url: format!("https://example.invalid/{}", title.replace(' ', "-")),
        thumbnail: String::new(),
    }
}

/// Build a service over a fresh temporary download directory
pub async fn create_service(candidates: Vec<Suggestion>) -> (Arc<TuneFetch>, TempDir) {
    let temp_dir = tempfile::tempdir().expect("temp dir");

    let mut config = Config::default();
    config.storage.download_dir = temp_dir.path().join("music");
    config.engine.search_path = false;
    config.server.api.swagger_ui = false;
    tokio::fs::create_dir_all(&config.storage.download_dir)
        .await
        .expect("download dir");

    let service = TuneFetch::with_backends(
        config,
        Arc::new(LocalEngine {
            payload: vec![0u8; 4096],
        }),
        Arc::new(FixedProvider { candidates }),
    )
    .expect("service");

    (Arc::new(service), temp_dir)
}

/// Poll until the job is terminal, panicking after a few seconds
pub async fn wait_for_terminal(service: &TuneFetch, id: &JobId) -> JobRecord {
    for _ in 0..300 {
        let record = service.poll(id).await.expect("poll");
        if record.is_terminal() {
            return record;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {} did not finish in time", id);
}
