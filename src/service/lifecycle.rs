//! Shutdown coordination.

use super::TuneFetch;

impl TuneFetch {
    /// Shut down the service
    ///
    /// Stops the job store actor and signals the API server (if spawned) to
    /// finish in-flight requests and exit. Jobs still running keep going
    /// until their engine process exits, but their updates are dropped and
    /// later polls fail with [`crate::Error::JobStoreClosed`].
    pub async fn shutdown(&self) {
        tracing::info!("Initiating shutdown");
        self.shutdown_token.cancel();

        // Give the store actor a chance to observe cancellation
        tokio::task::yield_now().await;
        tracing::info!("Shutdown complete");
    }

    /// Whether [`TuneFetch::shutdown`] has been called
    pub fn is_shut_down(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Token cancelled on shutdown, for tasks tied to the service lifetime
    pub(crate) fn shutdown_token(&self) -> tokio_util::sync::CancellationToken {
        self.shutdown_token.clone()
    }
}
