//! Lead and trail padding around a job's nominal slot

use chrono::{DateTime, Duration, Utc};

use super::worker::PlayoutRequest;
use crate::models::PlayoutJob;

/// Pre-roll and maximum post-roll applied before dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding {
    /// Subtracted from the start
    pub pre: Duration,

    /// Upper bound for the time added after the nominal end
    pub max_post: Duration,
}

impl Padding {
    pub fn new(pre: Duration, max_post: Duration) -> Self {
        Self { pre, max_post }
    }

    /// No padding at all, used for manual requests
    pub fn none() -> Self {
        Self::new(Duration::zero(), Duration::zero())
    }

    /// Post-roll for `job`: the configured maximum, cut down to the gap
    /// before the next job in the same room when that gap is smaller.
    pub fn post_for(&self, job: &PlayoutJob) -> Duration {
        match job.gap_to_next() {
            Some(gap) if gap < self.max_post => gap,
            _ => self.max_post,
        }
    }

    /// Build the worker request for `job` with padding applied.
    /// Times saturate at chrono's range instead of overflowing.
    pub fn apply(&self, job: &PlayoutJob) -> PlayoutRequest {
        let end = job.end();
        PlayoutRequest {
            id: job.id,
            start_at: job
                .start
                .checked_sub_signed(self.pre)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            stop_at: end
                .checked_add_signed(self.post_for(job))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            source: job.source.clone(),
            version: job.version.clone(),
        }
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self::none()
    }
}
