//! Asynchronous fetch jobs
//!
//! - [`JobStore`] - actor owning the id → record map; the single source of
//!   truth read by pollers and written by runners
//! - [`JobRunner`] - runs one job on its own task and translates engine
//!   progress into records
//! - [`JobIdGenerator`] - unique, increasing job ids

mod runner;
mod store;

pub use runner::JobRunner;
pub use store::JobStore;

use crate::types::JobId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Generates job ids from the current time in milliseconds
///
/// Ids are strictly increasing within a process: when two submissions land
/// in the same millisecond (or the clock steps back) the next id is the
/// previous one plus one.
#[derive(Debug, Default)]
pub struct JobIdGenerator {
    last: AtomicU64,
}

impl JobIdGenerator {
    /// Create a generator
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next id
    pub fn next_id(&self) -> JobId {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return JobId(candidate.to_string()),
                Err(actual) => current = actual,
            }
        }
    }
}
