//! External collaborators: the fetch-and-transcode engine and the metadata provider
//!
//! The service only talks to these through the [`FetchEngine`] and
//! [`MetadataProvider`] traits. Two implementations are provided:
//!
//! - [`YtDlp`]: drives the external `yt-dlp` binary
//! - [`UnavailableEngine`]: stub used when no binary can be found, so the
//!   server still starts and the catalog keeps working
//!
//! ## Usage
//!
//! ```no_run
//! use tunefetch::engine::{MetadataProvider, YtDlp};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ytdlp = YtDlp::from_path().expect("yt-dlp binary not found");
//!
//!     let track = ytdlp.resolve("around the world daft punk").await?;
//!     println!("{} by {} ({}s)", track.title, track.artist, track.duration);
//!
//!     Ok(())
//! }
//! ```

mod parser;
mod traits;
mod unavailable;
mod ytdlp;

pub use parser::{FetchLine, engine_failure_message, parse_candidate, parse_fetch_line, parse_track};
pub use traits::{FetchEngine, MetadataProvider};
pub use unavailable::UnavailableEngine;
pub use ytdlp::YtDlp;

use crate::config::EngineConfig;
use std::sync::Arc;

/// Pick the engine and provider implementations for a configuration
///
/// An explicit `binary_path` wins; otherwise PATH is searched when allowed.
/// Falls back to [`UnavailableEngine`] when nothing is found.
pub fn select_backends(
    config: &EngineConfig,
) -> (Arc<dyn FetchEngine>, Arc<dyn MetadataProvider>) {
    let ytdlp = if let Some(ref binary_path) = config.binary_path {
        Some(YtDlp::new(binary_path.clone()))
    } else if config.search_path {
        YtDlp::from_path()
    } else {
        None
    };

    match ytdlp {
        Some(ytdlp) => {
            let ytdlp = Arc::new(ytdlp.with_extra_args(config.extra_args.clone()));
            tracing::info!(
                binary = %ytdlp.binary_path().display(),
                "Fetch engine initialized"
            );
            let engine: Arc<dyn FetchEngine> = ytdlp.clone();
            let provider: Arc<dyn MetadataProvider> = ytdlp;
            (engine, provider)
        }
        None => {
            tracing::warn!(
                "yt-dlp not found; fetch jobs and search will fail until engine.binary_path is configured"
            );
            let engine: Arc<dyn FetchEngine> = Arc::new(UnavailableEngine);
            let provider: Arc<dyn MetadataProvider> = Arc::new(UnavailableEngine);
            (engine, provider)
        }
    }
}
