//! Job runner: drives one fetch from `starting` to a terminal state

use super::store::JobStore;
use crate::engine::FetchEngine;
use crate::error::{Error, Result};
use crate::progress::{RawProgress, normalize};
use crate::types::{ArtifactInfo, FetchSpec, JobEvent, JobId, JobRecord, JobStatus};
use crate::utils::human_size;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Buffer between the engine task and the runner
const PROGRESS_CHANNEL_BUFFER: usize = 256;

/// Runs fetch jobs and publishes their records
///
/// Each job is the only writer of its own id, so records for one job are
/// written in the order the engine produced its events.
#[derive(Clone)]
pub struct JobRunner {
    store: JobStore,
    engine: Arc<dyn FetchEngine>,
    output_dir: PathBuf,
    event_tx: broadcast::Sender<JobEvent>,
}

impl JobRunner {
    /// Create a runner writing into `store` and artifacts into `output_dir`
    pub fn new(
        store: JobStore,
        engine: Arc<dyn FetchEngine>,
        output_dir: PathBuf,
        event_tx: broadcast::Sender<JobEvent>,
    ) -> Self {
        Self {
            store,
            engine,
            output_dir,
            event_tx,
        }
    }

    /// Run a job on its own task
    ///
    /// The caller is expected to have written the `starting` record already.
    pub fn spawn(&self, id: JobId, spec: FetchSpec) -> JoinHandle<JobRecord> {
        let runner = self.clone();
        tokio::spawn(async move { runner.run(id, spec).await })
    }

    /// Run a job to completion and return its terminal record
    pub async fn run(&self, id: JobId, spec: FetchSpec) -> JobRecord {
        let (progress_tx, mut progress_rx) = mpsc::channel(PROGRESS_CHANNEL_BUFFER);

        let engine = self.engine.clone();
        let fetch_spec = spec.clone();
        let output_dir = self.output_dir.clone();
        let mut fetch = tokio::spawn(async move {
            engine.fetch(&fetch_spec, &output_dir, progress_tx).await
        });

        let mut tracker = PhaseTracker::new();
        let joined = loop {
            tokio::select! {
                biased;
                Some(event) = progress_rx.recv() => {
                    self.apply_event(&id, &mut tracker, &event).await;
                }
                joined = &mut fetch => break joined,
            }
        };

        // Events sent right before the engine returned
        while let Ok(event) = progress_rx.try_recv() {
            self.apply_event(&id, &mut tracker, &event).await;
        }

        let outcome = match joined {
            Ok(result) => result,
            Err(e) => Err(Error::Other(format!("fetch task failed: {}", e))),
        };

        let record = match outcome {
            Ok(path) => match self.describe_artifact(&path, &spec).await {
                Ok(info) => JobRecord::done(info),
                Err(e) => JobRecord::failed(e.to_string()),
            },
            Err(e) => JobRecord::failed(e.to_string()),
        };

        match (&record.result, &record.error) {
            (Some(result), _) => tracing::info!(
                job_id = %id,
                filename = %result.filename,
                size = result.size,
                codec = %result.codec,
                "Job finished"
            ),
            (_, Some(error)) => tracing::warn!(job_id = %id, error = %error, "Job failed"),
            _ => {}
        }

        self.publish(&id, record.clone()).await;
        record
    }

    async fn apply_event(&self, id: &JobId, tracker: &mut PhaseTracker, event: &RawProgress) {
        if let RawProgress::Other(message) = event {
            tracing::trace!(job_id = %id, message = %message, "Engine output");
        }
        if let Some(record) = tracker.advance(event) {
            self.publish(id, record).await;
        }
    }

    async fn publish(&self, id: &JobId, record: JobRecord) {
        match self.store.put(id.clone(), record.clone()).await {
            Ok(true) => {
                // No subscribers is fine
                self.event_tx
                    .send(JobEvent {
                        task_id: id.clone(),
                        record,
                    })
                    .ok();
            }
            Ok(false) => {}
            Err(e) => tracing::debug!(job_id = %id, error = %e, "Dropping job update"),
        }
    }

    /// Stat the produced file into the descriptor stored on `done`
    async fn describe_artifact(&self, path: &Path, spec: &FetchSpec) -> Result<ArtifactInfo> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.output_dir.join(path)
        };
        let metadata = tokio::fs::metadata(&path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::Engine(format!("engine reported an invalid path: {}", path.display()))
            })?;

        Ok(ArtifactInfo {
            filename,
            title: spec.title.clone(),
            size: metadata.len(),
            size_human: human_size(metadata.len()),
            codec: spec.codec,
        })
    }
}

/// Applies the phase rules to the normalized event stream
///
/// - percent never decreases within a phase
/// - once converting, late download events are ignored
/// - an update identical to the last one is dropped
struct PhaseTracker {
    current: JobRecord,
}

impl PhaseTracker {
    fn new() -> Self {
        Self {
            current: JobRecord::starting(),
        }
    }

    fn advance(&mut self, event: &RawProgress) -> Option<JobRecord> {
        let progress = normalize(event)?;

        if self.current.status == JobStatus::Converting
            && progress.status == JobStatus::Downloading
        {
            return None;
        }
        if progress.status == self.current.status && progress.percent <= self.current.percent {
            return None;
        }

        self.current = JobRecord::in_progress(progress.status, progress.percent);
        Some(self.current.clone())
    }
}
