//! Periodic schedule fetch and job set reconciliation

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::jobs::{build_jobs, reconcile, ReconcileReport};
use crate::models::{JobId, JobSet};
use crate::pubsub::Hub;
use crate::schedule::{FetchError, ScheduleSource};

/// Result of a single poll
#[derive(Debug)]
pub enum PollOutcome {
    /// A new document version was reconciled into the job set
    Changed(ReconcileReport),
    /// The document version matched the last one seen
    Unchanged,
    /// The fetch failed; the previous job set is kept
    Failed(FetchError),
}

impl PollOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, PollOutcome::Changed(_))
    }
}

/// Fetches the schedule and owns the authoritative job set
pub struct SchedulePoller {
    source: Arc<dyn ScheduleSource>,
    sources: Arc<HashMap<JobId, String>>,
    interval: Duration,
    hub: Arc<Hub>,
    version: Option<String>,
    jobs: Arc<JobSet>,
}

impl SchedulePoller {
    pub fn new(
        source: Arc<dyn ScheduleSource>,
        sources: Arc<HashMap<JobId, String>>,
        interval: Duration,
        hub: Arc<Hub>,
    ) -> Self {
        Self {
            source,
            sources,
            interval,
            hub,
            version: None,
            jobs: Arc::new(JobSet::new()),
        }
    }

    /// Last document version reconciled, if any
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn jobs(&self) -> Arc<JobSet> {
        Arc::clone(&self.jobs)
    }

    /// Fetch once and reconcile if the version moved.
    ///
    /// Does not publish; see [`SchedulePoller::publish`].
    pub async fn poll_once(&mut self) -> PollOutcome {
        let document = match self.source.fetch().await {
            Ok(doc) => doc,
            Err(e) => return PollOutcome::Failed(e),
        };

        if self.version.as_deref() == Some(document.version()) {
            return PollOutcome::Unchanged;
        }

        let fresh = build_jobs(&document, &self.sources);
        let previous = Arc::unwrap_or_clone(std::mem::take(&mut self.jobs));
        let (merged, report) = reconcile(previous, fresh);

        self.jobs = Arc::new(merged);
        self.version = Some(document.version().to_string());
        PollOutcome::Changed(report)
    }

    /// Push the current job set to the `jobs` topic
    pub fn publish(&self) -> usize {
        self.hub.jobs.publish(Arc::clone(&self.jobs))
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Poll immediately, publish, then poll on every interval tick until shutdown
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Schedule poller started"
        );

        let outcome = self.poll_once().await;
        self.log_outcome(&outcome);
        // dependents wait on the first value, so publish even after a failed fetch
        self.publish();

        let mut interval = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let outcome = self.poll_once().await;
                    self.log_outcome(&outcome);
                    if outcome.is_changed() {
                        self.publish();
                    }
                }
                _ = shutdown.changed() => {
                    tracing::info!("Schedule poller shutting down");
                    break;
                }
            }
        }
    }

    fn log_outcome(&self, outcome: &PollOutcome) {
        match outcome {
            PollOutcome::Changed(report) => tracing::info!(
                version = self.version().unwrap_or_default(),
                jobs = self.jobs.len(),
                added = report.added.len(),
                updated = report.updated.len(),
                removed = report.removed.len(),
                "Schedule changed"
            ),
            PollOutcome::Unchanged => tracing::debug!("Schedule version unchanged"),
            PollOutcome::Failed(e) => tracing::warn!(
                error = %e,
                recoverable = e.is_recoverable(),
                "Schedule fetch failed, keeping previous jobs"
            ),
        }
    }
}
