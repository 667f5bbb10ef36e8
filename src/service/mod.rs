//! The service handle, split into focused submodules.
//!
//! The `TuneFetch` struct and its methods are organized by domain:
//! - [`jobs`] - Submit and poll fetch jobs
//! - [`lookup`] - Metadata resolution and suggestions
//! - [`library`] - Catalog listing, file access and deletion
//! - [`lifecycle`] - Shutdown coordination

mod jobs;
mod library;
mod lifecycle;
mod lookup;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub(crate) use lookup::SuggestionFilter;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::engine::{FetchEngine, MetadataProvider, select_backends};
use crate::error::{Error, Result};
use crate::jobs::{JobIdGenerator, JobRunner, JobStore};
use crate::types::JobEvent;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Buffer size of the job event broadcast channel
const EVENT_CHANNEL_BUFFER: usize = 1000;

/// Main service instance (cloneable - all fields are Arc-wrapped or handles)
#[derive(Clone)]
pub struct TuneFetch {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Handle to the job store actor
    pub(crate) store: JobStore,
    /// Job id source shared by all submitters
    pub(crate) ids: Arc<JobIdGenerator>,
    /// Spawns one task per job
    pub(crate) runner: JobRunner,
    /// Metadata provider behind resolve and suggest
    pub(crate) provider: Arc<dyn MetadataProvider>,
    /// Scanner over the storage directory
    pub(crate) catalog: Catalog,
    /// Compiled suggestion rules
    pub(crate) suggestion_filter: Arc<SuggestionFilter>,
    /// Job event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<JobEvent>,
    /// Cancelled on shutdown; stops the store actor and the API server
    pub(crate) shutdown_token: CancellationToken,
}

impl TuneFetch {
    /// Create a new TuneFetch instance
    ///
    /// This initializes all core components:
    /// - Creates the storage directory if missing
    /// - Detects the yt-dlp binary (falling back to an unavailable engine)
    /// - Spawns the job store actor
    pub async fn new(config: Config) -> Result<Self> {
        let download_dir = config.download_dir().clone();
        tokio::fs::create_dir_all(&download_dir).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create download directory '{}': {}",
                    download_dir.display(),
                    e
                ),
            ))
        })?;

        let (engine, provider) = select_backends(&config.engine);
        Self::with_backends(config, engine, provider)
    }

    /// Create an instance with explicit engine and provider implementations
    ///
    /// Must be called from within a Tokio runtime, since it spawns the job
    /// store actor. The storage directory is not created.
    pub fn with_backends(
        config: Config,
        engine: Arc<dyn FetchEngine>,
        provider: Arc<dyn MetadataProvider>,
    ) -> Result<Self> {
        let suggestion_filter = Arc::new(SuggestionFilter::from_config(&config.suggestions)?);
        let shutdown_token = CancellationToken::new();
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_BUFFER);

        let store = JobStore::spawn(&config.jobs, shutdown_token.child_token());
        let runner = JobRunner::new(
            store.clone(),
            engine.clone(),
            config.download_dir().clone(),
            event_tx.clone(),
        );
        let catalog = Catalog::new(config.download_dir().clone());

        tracing::info!(
            engine = engine.name(),
            provider = provider.name(),
            download_dir = %config.download_dir().display(),
            "TuneFetch initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            ids: Arc::new(JobIdGenerator::new()),
            runner,
            provider,
            catalog,
            suggestion_filter,
            event_tx,
            shutdown_token,
        })
    }

    /// Subscribe to job events
    ///
    /// Every accepted record change (including the initial `starting`
    /// record) is delivered as a [`JobEvent`]. Slow subscribers may miss
    /// events when the channel lags.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    /// Configuration this instance was built with
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Spawn the REST API server in a background task
    ///
    /// The server stops when [`TuneFetch::shutdown`] is called.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tunefetch::{Config, TuneFetch};
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let service = Arc::new(TuneFetch::new(Config::default()).await?);
    /// let api_handle = service.spawn_api_server();
    ///
    /// // ... later
    /// service.shutdown().await;
    /// api_handle.await??;
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let service = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(service, config).await })
    }
}
