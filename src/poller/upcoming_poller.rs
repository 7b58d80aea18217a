//! Periodic recomputation of the upcoming window

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::jobs::{reconcile, upcoming_at, ReconcileReport};
use crate::models::JobSet;
use crate::pubsub::{Hub, Subscription};

/// Tick period for the upcoming poller: a quarter of the shorter of the
/// schedule refresh interval and the lookahead window. Never zero, since
/// `tokio::time::interval` rejects a zero period.
pub fn poll_interval(refresh: Duration, window: Duration) -> Duration {
    (refresh.min(window) / 4).max(Duration::from_nanos(1))
}

/// Keeps the upcoming set current against a moving clock
pub struct UpcomingPoller {
    jobs_rx: Subscription<Arc<JobSet>>,
    hub: Arc<Hub>,
    lookahead: chrono::Duration,
    interval: Duration,
    jobs: Option<Arc<JobSet>>,
    upcoming: JobSet,
}

impl UpcomingPoller {
    /// Subscribes to `jobs` right away so no published job set is missed
    pub fn new(hub: Arc<Hub>, lookahead: chrono::Duration, interval: Duration) -> Self {
        Self {
            jobs_rx: hub.jobs.subscribe(),
            hub,
            lookahead,
            interval,
            jobs: None,
            upcoming: JobSet::new(),
        }
    }

    pub fn upcoming(&self) -> &JobSet {
        &self.upcoming
    }

    /// Recompute the window at `now` from the newest job set and publish it.
    ///
    /// Returns `None` while no job set has been received yet.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<ReconcileReport> {
        if let Some(latest) = self.jobs_rx.latest() {
            self.jobs = Some(latest);
        }
        let jobs = self.jobs.as_ref()?;

        let fresh = upcoming_at(jobs, self.lookahead, now);
        let (merged, report) = reconcile(std::mem::take(&mut self.upcoming), fresh);
        self.upcoming = merged;

        if !report.is_noop() {
            tracing::info!(
                upcoming = self.upcoming.len(),
                added = report.added.len(),
                removed = report.removed.len(),
                "Upcoming window changed"
            );
        }
        self.hub.upcoming.publish(Arc::new(self.upcoming.clone()));
        Some(report)
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Wait for the first job set, then recompute on every tick until shutdown
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            lookahead_secs = self.lookahead.num_seconds(),
            "Upcoming poller started"
        );

        tokio::select! {
            first = self.jobs_rx.recv() => match first {
                Some(jobs) => self.jobs = Some(jobs),
                None => return,
            },
            _ = shutdown.changed() => return,
        }
        self.tick_at(Utc::now());

        let mut interval = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick_at(Utc::now());
                }
                _ = shutdown.changed() => {
                    tracing::info!("Upcoming poller shutting down");
                    break;
                }
            }
        }
    }
}
