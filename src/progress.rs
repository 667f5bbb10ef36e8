//! Progress normalization
//!
//! The engine reports progress as a stream of [`RawProgress`] events whose
//! shape depends on the phase it is in. [`normalize`] maps one event to the
//! `(status, percent)` pair stored in a job record. It never fails: missing
//! or zero sizes degrade to 0 percent.

use crate::types::JobStatus;

/// Total size of the resource being retrieved, as far as the engine knows it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TotalSize {
    /// Exact size announced by the source
    Known(u64),
    /// Engine estimate (e.g. fragment count times fragment size)
    Estimated(u64),
    /// No size information
    Unknown,
}

impl TotalSize {
    /// Build from the engine's two optional size fields, preferring the exact one
    pub fn from_fields(total_bytes: Option<u64>, total_bytes_estimate: Option<u64>) -> Self {
        match (total_bytes, total_bytes_estimate) {
            (Some(total), _) if total > 0 => TotalSize::Known(total),
            (_, Some(estimate)) if estimate > 0 => TotalSize::Estimated(estimate),
            _ => TotalSize::Unknown,
        }
    }

    /// Usable, non-zero byte count
    pub fn bytes(&self) -> Option<u64> {
        match *self {
            TotalSize::Known(n) | TotalSize::Estimated(n) if n > 0 => Some(n),
            _ => None,
        }
    }
}

/// One raw event emitted by the fetch-and-transcode engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawProgress {
    /// Retrieval is in progress
    Downloading {
        /// Bytes received so far
        downloaded_bytes: Option<u64>,
        /// Total size of the resource
        total: TotalSize,
    },
    /// Retrieval finished, encoding is about to start
    Finished,
    /// Anything else the engine reports (errors, post-processor chatter)
    Other(String),
}

/// Normalized progress for a job record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    /// New lifecycle state
    pub status: JobStatus,
    /// Percent within that state, 0..=100
    pub percent: u8,
}

/// Translate one raw engine event into a `(status, percent)` pair
///
/// Returns `None` for events that carry no progress information.
pub fn normalize(event: &RawProgress) -> Option<Progress> {
    match event {
        RawProgress::Downloading {
            downloaded_bytes,
            total,
        } => Some(Progress {
            status: JobStatus::Downloading,
            percent: percent_of(downloaded_bytes.unwrap_or(0), *total),
        }),
        RawProgress::Finished => Some(Progress {
            status: JobStatus::Converting,
            percent: 100,
        }),
        RawProgress::Other(_) => None,
    }
}

fn percent_of(downloaded: u64, total: TotalSize) -> u8 {
    match total.bytes() {
        Some(total) => {
            let pct = (u128::from(downloaded) * 100) / u128::from(total);
            pct.min(100) as u8
        }
        None => 0,
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn downloading(downloaded: Option<u64>, total: TotalSize) -> RawProgress {
        RawProgress::Downloading {
            downloaded_bytes: downloaded,
            total,
        }
    }

    #[test]
    fn known_total_floors_percentage() {
        let p = normalize(&downloading(Some(999), TotalSize::Known(1000))).unwrap();
        assert_eq!(p.status, JobStatus::Downloading);
        assert_eq!(p.percent, 99);
    }

    #[test]
    fn estimated_total_is_used_when_exact_is_missing() {
        let total = TotalSize::from_fields(None, Some(400));
        assert_eq!(total, TotalSize::Estimated(400));
        assert_eq!(normalize(&downloading(Some(100), total)).unwrap().percent, 25);
    }

    #[test]
    fn zero_or_unknown_total_degrades_to_zero() {
        for total in [
            TotalSize::Unknown,
            TotalSize::Known(0),
            TotalSize::from_fields(Some(0), Some(0)),
        ] {
            let p = normalize(&downloading(Some(5000), total)).unwrap();
            assert_eq!(p.status, JobStatus::Downloading);
            assert_eq!(p.percent, 0, "total {total:?}");
        }
    }

    #[test]
    fn missing_downloaded_bytes_is_zero_percent() {
        assert_eq!(
            normalize(&downloading(None, TotalSize::Known(10))).unwrap().percent,
            0
        );
    }

    #[test]
    fn overshooting_estimate_is_clamped() {
        let p = normalize(&downloading(Some(u64::MAX), TotalSize::Estimated(1))).unwrap();
        assert_eq!(p.percent, 100);
    }

    #[test]
    fn finished_pins_converting_at_hundred() {
        assert_eq!(
            normalize(&RawProgress::Finished),
            Some(Progress {
                status: JobStatus::Converting,
                percent: 100
            })
        );
    }

    #[test]
    fn other_events_produce_no_update() {
        assert_eq!(normalize(&RawProgress::Other("[info] x".into())), None);
    }

    #[test]
    fn percent_stays_in_range_for_any_pair() {
        let samples = [0, 1, 7, 99, 100, 101, 4096, u64::MAX / 2, u64::MAX];
        for &downloaded in &samples {
            for &total in &samples {
                let p = normalize(&downloading(Some(downloaded), TotalSize::Known(total)))
                    .unwrap();
                assert!(p.percent <= 100, "{downloaded}/{total} gave {}", p.percent);
            }
        }
    }
}
