//! Job submission and polling.

use crate::error::{Error, Result};
use crate::types::{Codec, FetchSpec, JobEvent, JobId, JobRecord, SubmitOptions};

use super::TuneFetch;

/// Title stored when the client does not provide one
const DEFAULT_TITLE: &str = "Unknown";

impl TuneFetch {
    /// Submit a fetch job and return its id immediately
    ///
    /// `locator` is either search text or a direct source URL. The job is
    /// recorded as `starting` before this returns; engine failures never
    /// surface here, only through a later [`TuneFetch::poll`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the locator is empty (no job is
    /// created) and [`Error::JobStoreClosed`] after shutdown.
    pub async fn submit(&self, locator: &str, options: SubmitOptions) -> Result<JobId> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(Error::Validation("No URL provided".to_string()));
        }

        let codec = Codec::from_request(options.codec.as_deref());
        let quality = codec.normalize_quality(options.quality);
        let title = options
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let spec = FetchSpec {
            locator: locator.to_string(),
            title,
            codec,
            quality,
        };

        let id = self.ids.next_id();
        let starting = JobRecord::starting();
        self.store.put(id.clone(), starting.clone()).await?;
        self.event_tx
            .send(JobEvent {
                task_id: id.clone(),
                record: starting,
            })
            .ok();

        tracing::info!(
            job_id = %id,
            locator = %spec.locator,
            title = %spec.title,
            codec = %spec.codec,
            quality = spec.quality,
            "Job submitted"
        );

        self.runner.spawn(id.clone(), spec);
        Ok(id)
    }

    /// Current record of a job
    ///
    /// Ids that were never submitted (or whose record has been evicted)
    /// return the unknown-job record rather than an error.
    pub async fn poll(&self, id: &JobId) -> Result<JobRecord> {
        self.store.get(id).await
    }
}
