//! Shared test helpers: scripted engine and provider doubles.

use crate::config::Config;
use crate::engine::{FetchEngine, MetadataProvider};
use crate::error::{Error, ResolutionError, Result};
use crate::progress::RawProgress;
use crate::service::TuneFetch;
use crate::types::{FetchSpec, Suggestion, TrackMetadata};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, mpsc};

/// What a scripted fetch ends with
#[derive(Clone, Debug)]
enum Outcome {
    /// Write a file of `size` bytes with this exact name
    Artifact { filename: String, size: usize },
    /// Write `<title>.<codec>` of `size` bytes
    TitledArtifact { size: usize },
    /// Report a path without creating it
    Missing { filename: String },
    /// Fail with an engine error
    Fail(String),
}

/// Engine that replays a fixed list of events
///
/// Optional gates park the fetch before the first event or before the
/// outcome, so tests can observe intermediate job states deterministically.
pub(crate) struct ScriptedEngine {
    events: Vec<RawProgress>,
    outcome: Outcome,
    start_gate: Option<Arc<Notify>>,
    finish_gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<FetchSpec>>,
}

impl ScriptedEngine {
    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            events: Vec::new(),
            outcome,
            start_gate: None,
            finish_gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn succeeding(filename: &str, size: usize) -> Self {
        Self::with_outcome(Outcome::Artifact {
            filename: filename.to_string(),
            size,
        })
    }

    /// Succeeds with a file named after the requested title and codec
    pub(crate) fn producing(size: usize) -> Self {
        Self::with_outcome(Outcome::TitledArtifact { size })
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self::with_outcome(Outcome::Fail(message.to_string()))
    }

    pub(crate) fn reporting_missing_file(filename: &str) -> Self {
        Self::with_outcome(Outcome::Missing {
            filename: filename.to_string(),
        })
    }

    pub(crate) fn with_events(mut self, events: Vec<RawProgress>) -> Self {
        self.events = events;
        self
    }

    pub(crate) fn gated_start(mut self, gate: Arc<Notify>) -> Self {
        self.start_gate = Some(gate);
        self
    }

    pub(crate) fn gated_finish(mut self, gate: Arc<Notify>) -> Self {
        self.finish_gate = Some(gate);
        self
    }

    /// Specs this engine was asked to fetch, in call order
    pub(crate) fn calls(&self) -> Vec<FetchSpec> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FetchEngine for ScriptedEngine {
    async fn fetch(
        &self,
        spec: &FetchSpec,
        output_dir: &Path,
        progress: mpsc::Sender<RawProgress>,
    ) -> Result<PathBuf> {
        self.calls.lock().unwrap().push(spec.clone());

        if let Some(gate) = &self.start_gate {
            gate.notified().await;
        }
        for event in &self.events {
            progress.send(event.clone()).await.ok();
        }
        if let Some(gate) = &self.finish_gate {
            gate.notified().await;
        }

        match &self.outcome {
            Outcome::Artifact { filename, size } => {
                let path = output_dir.join(filename);
                tokio::fs::write(&path, vec![0u8; *size]).await?;
                Ok(path)
            }
            Outcome::TitledArtifact { size } => {
                let path = output_dir.join(format!("{}.{}", spec.title, spec.codec));
                tokio::fs::write(&path, vec![0u8; *size]).await?;
                Ok(path)
            }
            Outcome::Missing { filename } => Ok(output_dir.join(filename)),
            Outcome::Fail(message) => Err(Error::Engine(message.clone())),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Provider returning canned metadata and search candidates
pub(crate) struct ScriptedProvider {
    track: Option<TrackMetadata>,
    candidates: std::result::Result<Vec<Suggestion>, String>,
    searches: Mutex<Vec<(String, usize)>>,
}

impl ScriptedProvider {
    pub(crate) fn new(
        track: Option<TrackMetadata>,
        candidates: std::result::Result<Vec<Suggestion>, String>,
    ) -> Self {
        Self {
            track,
            candidates,
            searches: Mutex::new(Vec::new()),
        }
    }

    /// Provider that finds nothing
    pub(crate) fn empty() -> Self {
        Self::new(None, Ok(Vec::new()))
    }

    /// `(query, limit)` pairs passed to `search`
    pub(crate) fn searches(&self) -> Vec<(String, usize)> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataProvider for ScriptedProvider {
    async fn resolve(&self, query: &str) -> Result<TrackMetadata> {
        self.track.clone().ok_or_else(|| {
            ResolutionError::NotFound {
                query: query.to_string(),
            }
            .into()
        })
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>> {
        self.searches
            .lock()
            .unwrap()
            .push((query.to_string(), limit));
        self.candidates.clone().map_err(Error::ExternalTool)
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub(crate) fn sample_track() -> TrackMetadata {
    TrackMetadata {
        title: "Around the World".to_string(),
        artist: "Daft Punk".to_string(),
        album: Some("Homework".to_string()),
        duration: 429,
        url: "https://www.youtube.com/watch?v=dwDns8x3Jb4".to_string(),
        thumbnail: "https://i.ytimg.com/vi/dwDns8x3Jb4/hqdefault.jpg".to_string(),
    }
}

pub(crate) fn candidate(title: &str, duration: u64) -> Suggestion {
    Suggestion {
        title: title.to_string(),
        artist: "Uploader".to_string(),
        duration,
        url: format!("https://www.youtube.com/watch?v={}", title.replace(' ', "_")),
        thumbnail: String::new(),
    }
}

/// Create a service over a temporary storage directory
///
/// Returns the service and the tempdir (which must be kept alive).
pub(crate) fn create_test_service(
    engine: Arc<dyn FetchEngine>,
    provider: Arc<dyn MetadataProvider>,
) -> (TuneFetch, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();

    let mut config = Config::default();
    config.storage.download_dir = temp_dir.path().join("downloads");
    std::fs::create_dir_all(&config.storage.download_dir).unwrap();

    let service = TuneFetch::with_backends(config, engine, provider).unwrap();
    (service, temp_dir)
}

/// Poll until the job reaches a terminal state
pub(crate) async fn wait_for_terminal(
    service: &TuneFetch,
    id: &crate::types::JobId,
) -> crate::types::JobRecord {
    for _ in 0..200 {
        let record = service.poll(id).await.unwrap();
        if record.is_terminal() {
            return record;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("job {id} did not finish in time");
}
