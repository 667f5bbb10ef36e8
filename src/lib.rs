//! # tunefetch
//!
//! Search for songs, fetch them in the background as mp3 or opus, and serve
//! the resulting library over HTTP.
//!
//! ## Design
//!
//! - **Non-blocking submission** - a fetch returns a job id immediately and
//!   runs on its own task; clients poll (or subscribe) for progress
//! - **Single-owner job state** - job records live in an actor, so every
//!   poll sees a whole record and finished jobs never change again
//! - **Pluggable engine** - the fetch engine and metadata provider are
//!   traits; `yt-dlp` is the default implementation
//! - **Stateless library** - the catalog is the storage directory itself
//!
//! ## Quick Start
//!
//! ```no_run
//! use tunefetch::{Config, SubmitOptions, TuneFetch};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = TuneFetch::new(Config::default()).await?;
//!
//!     // Subscribe first so no event of the new job is missed
//!     let mut events = service.subscribe();
//!
//!     let id = service
//!         .submit(
//!             "daft punk around the world",
//!             SubmitOptions {
//!                 codec: Some("opus".to_string()),
//!                 ..Default::default()
//!             },
//!         )
//!         .await?;
//!
//!     while let Ok(event) = events.recv().await {
//!         println!("{}: {} {}%", event.task_id, event.record.status, event.record.percent);
//!         if event.task_id == id && event.record.is_terminal() {
//!             break;
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Catalog of stored files
pub mod catalog;
/// Configuration types
pub mod config;
/// Fetch engine and metadata provider adapters
pub mod engine;
/// Error types
pub mod error;
/// Job store, runner and id generation
pub mod jobs;
/// Progress normalization
pub mod progress;
/// Service handle (decomposed into focused submodules)
pub mod service;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use catalog::Catalog;
pub use config::Config;
pub use engine::{FetchEngine, MetadataProvider, UnavailableEngine, YtDlp};
pub use error::{ApiError, CatalogError, Error, ErrorDetail, ResolutionError, Result, ToHttpStatus};
pub use service::TuneFetch;
pub use types::{
    ArtifactInfo, CatalogEntry, Codec, JobEvent, JobId, JobRecord, JobStatus, SubmitOptions,
    Suggestion, TrackMetadata,
};

/// Helper function to run the service with graceful signal handling.
///
/// Waits for a termination signal and then calls the service's `shutdown()` method,
/// which also stops an API server started with [`TuneFetch::spawn_api_server`].
///
/// Listens for SIGTERM (Unix only) and Ctrl+C.
///
/// # Example
///
/// ```no_run
/// use tunefetch::{Config, TuneFetch, run_with_shutdown};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let service = Arc::new(TuneFetch::new(Config::default()).await?);
///     let api = service.spawn_api_server();
///
///     // Run with automatic signal handling
///     run_with_shutdown(&service).await;
///     api.await??;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(service: &TuneFetch) {
    wait_for_signal().await;
    service.shutdown().await;
}

/// Serve the REST API until a termination signal, then shut down
///
/// Returns early with the server's error when it stops on its own (for
/// instance when the bind address is already in use), shutting the service
/// down first.
///
/// # Example
///
/// ```no_run
/// use tunefetch::{Config, TuneFetch, serve_until_shutdown};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let service = Arc::new(TuneFetch::new(Config::default()).await?);
///     serve_until_shutdown(&service).await?;
///     Ok(())
/// }
/// ```
pub async fn serve_until_shutdown(service: &std::sync::Arc<TuneFetch>) -> Result<()> {
    let mut api = service.spawn_api_server();

    tokio::select! {
        finished = &mut api => {
            service.shutdown().await;
            return api_outcome(finished);
        }
        _ = run_with_shutdown(service) => {}
    }

    api_outcome(api.await)
}

fn api_outcome(finished: std::result::Result<Result<()>, tokio::task::JoinError>) -> Result<()> {
    match finished {
        Ok(Ok(())) => {
            tracing::info!("API server stopped");
            Ok(())
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "API server failed");
            Err(e)
        }
        Err(e) => {
            tracing::error!(error = %e, "API server task panicked");
            Err(Error::Other(format!("API server task failed: {}", e)))
        }
    }
}

/// Resolve on SIGTERM or Ctrl+C (SIGINT)
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => tracing::info!(signal = "SIGTERM", "Received termination signal"),
                    _ = tokio::signal::ctrl_c() => tracing::info!(signal = "SIGINT", "Received termination signal"),
                }
                return;
            }
            Err(e) => {
                // Restricted environments (containers, tests) may refuse registration
                tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for Ctrl+C only");
            }
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!(signal = "SIGINT", "Received termination signal"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C signal"),
    }
}
