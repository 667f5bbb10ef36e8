//! Job store actor
//!
//! A single task owns the id → record map. Every read and write is a message
//! on one channel, so each command sees the map exactly as the previous
//! command left it: readers never observe a half-applied update, and a
//! write acknowledged to its sender is visible to every later read.

use crate::config::JobConfig;
use crate::error::{Error, Result};
use crate::types::{JobId, JobRecord};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Buffer size for the store command channel
const STORE_CHANNEL_BUFFER: usize = 1024;

/// Lower bound for the sweep interval (tokio intervals cannot be zero)
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

/// Command sent to the store actor
enum StoreCommand {
    Put {
        id: JobId,
        record: JobRecord,
        respond_to: oneshot::Sender<bool>,
    },
    Get {
        id: JobId,
        respond_to: oneshot::Sender<JobRecord>,
    },
    Len {
        respond_to: oneshot::Sender<usize>,
    },
}

struct Entry {
    record: JobRecord,
    /// Set when the record became terminal; drives retention
    finished_at: Option<Instant>,
}

/// Handle to the job store actor (cheap to clone)
#[derive(Clone)]
pub struct JobStore {
    command_tx: mpsc::Sender<StoreCommand>,
}

impl JobStore {
    /// Spawn the store actor on the current runtime
    ///
    /// The actor runs until `shutdown` is cancelled or every handle is
    /// dropped. Terminal records older than `config.retention` are evicted
    /// (a zero retention keeps them for the process lifetime).
    pub fn spawn(config: &JobConfig, shutdown: CancellationToken) -> Self {
        let (command_tx, command_rx) = mpsc::channel(STORE_CHANNEL_BUFFER);
        let retention = (!config.retention.is_zero()).then_some(config.retention);
        let sweep_interval = config.sweep_interval.max(MIN_SWEEP_INTERVAL);

        tokio::spawn(run_store(command_rx, retention, sweep_interval, shutdown));

        Self { command_tx }
    }

    /// Replace the record for `id`
    ///
    /// Returns `Ok(false)` when the existing record is terminal; terminal
    /// records are never overwritten.
    pub async fn put(&self, id: JobId, record: JobRecord) -> Result<bool> {
        let (respond_to, response) = oneshot::channel();
        self.command_tx
            .send(StoreCommand::Put {
                id,
                record,
                respond_to,
            })
            .await
            .map_err(|_| Error::JobStoreClosed)?;
        response.await.map_err(|_| Error::JobStoreClosed)
    }

    /// Current record for `id`, or the unknown-job record
    pub async fn get(&self, id: &JobId) -> Result<JobRecord> {
        let (respond_to, response) = oneshot::channel();
        self.command_tx
            .send(StoreCommand::Get {
                id: id.clone(),
                respond_to,
            })
            .await
            .map_err(|_| Error::JobStoreClosed)?;
        response.await.map_err(|_| Error::JobStoreClosed)
    }

    /// Number of records currently held
    pub async fn len(&self) -> Result<usize> {
        let (respond_to, response) = oneshot::channel();
        self.command_tx
            .send(StoreCommand::Len { respond_to })
            .await
            .map_err(|_| Error::JobStoreClosed)?;
        response.await.map_err(|_| Error::JobStoreClosed)
    }
}

async fn run_store(
    mut command_rx: mpsc::Receiver<StoreCommand>,
    retention: Option<Duration>,
    sweep_interval: Duration,
    shutdown: CancellationToken,
) {
    let mut jobs: HashMap<JobId, Entry> = HashMap::new();
    let mut sweep = tokio::time::interval(sweep_interval);
    sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            command = command_rx.recv() => {
                let Some(command) = command else {
                    break;
                };
                handle_command(&mut jobs, command);
            }
            _ = sweep.tick(), if retention.is_some() => {
                if let Some(retention) = retention {
                    let evicted = evict_expired(&mut jobs, Instant::now(), retention);
                    if evicted > 0 {
                        tracing::debug!(evicted, remaining = jobs.len(), "Evicted expired job records");
                    }
                }
            }
        }
    }

    tracing::debug!(jobs = jobs.len(), "Job store stopped");
}

fn handle_command(jobs: &mut HashMap<JobId, Entry>, command: StoreCommand) {
    match command {
        StoreCommand::Put {
            id,
            record,
            respond_to,
        } => {
            let accepted = apply_put(jobs, id, record, Instant::now());
            respond_to.send(accepted).ok();
        }
        StoreCommand::Get { id, respond_to } => {
            let record = jobs
                .get(&id)
                .map(|entry| entry.record.clone())
                .unwrap_or_else(JobRecord::unknown);
            respond_to.send(record).ok();
        }
        StoreCommand::Len { respond_to } => {
            respond_to.send(jobs.len()).ok();
        }
    }
}

fn apply_put(jobs: &mut HashMap<JobId, Entry>, id: JobId, record: JobRecord, now: Instant) -> bool {
    if let Some(existing) = jobs.get(&id)
        && existing.record.is_terminal()
    {
        tracing::warn!(
            job_id = %id,
            status = %existing.record.status,
            rejected = %record.status,
            "Ignoring update to finished job"
        );
        return false;
    }

    let finished_at = record.is_terminal().then_some(now);
    jobs.insert(
        id,
        Entry {
            record,
            finished_at,
        },
    );
    true
}

/// Remove terminal records that finished more than `retention` before `now`
fn evict_expired(jobs: &mut HashMap<JobId, Entry>, now: Instant, retention: Duration) -> usize {
    let before = jobs.len();
    jobs.retain(|_, entry| match entry.finished_at {
        Some(finished_at) => now.saturating_duration_since(finished_at) < retention,
        None => true,
    });
    before - jobs.len()
}
