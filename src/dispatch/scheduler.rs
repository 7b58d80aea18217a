//! Dispatch scheduler
//!
//! Turns every published upcoming set into worker requests. Jobs whose
//! version was already acknowledged are skipped, so each job is dispatched
//! once per version. One job's failure never stops the rest of the round;
//! a failed job simply stays pending and is retried on the next upcoming
//! update.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use super::error::DispatchResult;
use super::padding::Padding;
use super::worker::PlayoutRequest;
use crate::models::{JobId, JobSet, PlayoutJob, ScheduledJob, ScheduledSet};
use crate::pubsub::{Hub, Subscription};
use crate::store::Store;

/// Dispatch behaviour
#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    /// Dispatch upcoming jobs automatically
    pub auto_schedule: bool,

    /// Padding for automatic dispatch
    pub padding: Padding,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            auto_schedule: false,
            padding: Padding::none(),
        }
    }
}

/// Outcome of one automatic dispatch round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    /// Jobs already acknowledged at their current version
    pub up_to_date: usize,

    /// Jobs acknowledged by a worker this round
    pub dispatched: Vec<JobId>,

    /// Jobs with no worker for their room and no default worker
    pub unrouted: Vec<JobId>,

    /// Jobs whose worker request failed
    pub failed: Vec<JobId>,
}

impl RoundReport {
    pub fn attempted(&self) -> usize {
        self.dispatched.len() + self.unrouted.len() + self.failed.len()
    }
}

/// Result of a manual dispatch
#[derive(Debug, Clone, Serialize)]
pub struct ManualDispatch {
    pub scheduled_job: ScheduledJob,
    pub scheduled: Arc<ScheduledSet>,
}

/// What happened to a single job handed to [`DispatchScheduler::send`]
enum Sent {
    Dispatched(ScheduledJob, Arc<ScheduledSet>),
    AlreadyCurrent(ScheduledJob, Arc<ScheduledSet>),
}

impl Sent {
    fn into_parts(self) -> (ScheduledJob, Arc<ScheduledSet>) {
        match self {
            Self::Dispatched(ack, set) | Self::AlreadyCurrent(ack, set) => (ack, set),
        }
    }
}

/// Jobs from `upcoming` that still need dispatching, ordered by start time
pub fn pending_jobs(upcoming: &JobSet, scheduled: &ScheduledSet) -> Vec<PlayoutJob> {
    let mut pending: Vec<PlayoutJob> = upcoming
        .values()
        .filter(|job| {
            !scheduled
                .get(&job.id)
                .is_some_and(|ack| ack.is_current_for(job))
        })
        .cloned()
        .collect();
    pending.sort_by(|a, b| a.start.cmp(&b.start).then(a.id.cmp(&b.id)));
    pending
}

/// Consumes upcoming sets and dispatches them to playout workers
pub struct DispatchScheduler {
    config: DispatchConfig,
    store: Arc<Store>,
    hub: Arc<Hub>,
    /// Authoritative scheduled set; held while a single job is in flight
    scheduled: Mutex<Arc<ScheduledSet>>,
}

impl DispatchScheduler {
    pub fn new(config: DispatchConfig, store: Arc<Store>, hub: Arc<Hub>) -> Self {
        Self {
            config,
            store,
            hub,
            scheduled: Mutex::new(Arc::new(ScheduledSet::new())),
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Current scheduled set as seen by the dispatcher
    pub async fn scheduled(&self) -> Arc<ScheduledSet> {
        self.scheduled.lock().await.clone()
    }

    /// Handle one published upcoming set. Returns `None` when automatic
    /// scheduling is disabled.
    pub async fn handle_upcoming(&self, upcoming: &JobSet) -> Option<RoundReport> {
        if !self.config.auto_schedule {
            tracing::trace!(count = upcoming.len(), "Automatic scheduling disabled, ignoring upcoming jobs");
            return None;
        }
        Some(self.run_round(upcoming).await)
    }

    /// Dispatch every job of `upcoming` not yet acknowledged at its version
    pub async fn run_round(&self, upcoming: &JobSet) -> RoundReport {
        let scheduled = self.scheduled().await;
        let pending = pending_jobs(upcoming, &scheduled);

        let mut report = RoundReport {
            up_to_date: upcoming.len() - pending.len(),
            ..Default::default()
        };

        if pending.is_empty() {
            tracing::debug!(upcoming = upcoming.len(), "All upcoming jobs already scheduled");
            return report;
        }

        for job in &pending {
            let request = self.config.padding.apply(job);
            match self.send(job, request, true).await {
                Ok(Sent::Dispatched(..)) => report.dispatched.push(job.id),
                Ok(Sent::AlreadyCurrent(..)) => report.up_to_date += 1,
                Err(e) if e.is_routing() => {
                    tracing::warn!(job_id = job.id, room = %job.room, "No worker for room, skipping job");
                    report.unrouted.push(job.id);
                }
                Err(e) => {
                    tracing::warn!(job_id = job.id, room = %job.room, error = %e, "Failed to schedule job");
                    report.failed.push(job.id);
                }
            }
        }

        tracing::info!(
            dispatched = report.dispatched.len(),
            unrouted = report.unrouted.len(),
            failed = report.failed.len(),
            up_to_date = report.up_to_date,
            "Dispatch round finished"
        );

        report
    }

    /// Dispatch a single job right away, without padding and regardless of
    /// whether its version was already acknowledged.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Routing` when no worker serves the job's room,
    /// or the worker error when the request fails.
    pub async fn schedule_manual(&self, job: &PlayoutJob) -> DispatchResult<ManualDispatch> {
        let request = PlayoutRequest::nominal(job);
        let (scheduled_job, scheduled) = self.send(job, request, false).await?.into_parts();

        tracing::info!(job_id = job.id, room = %job.room, handle = %scheduled_job.handle, "Manually scheduled job");
        Ok(ManualDispatch {
            scheduled_job,
            scheduled,
        })
    }

    /// Send one request and record the acknowledgement. With
    /// `skip_if_current` set, a job acknowledged at its version in the
    /// meantime is left alone.
    async fn send(
        &self,
        job: &PlayoutJob,
        request: PlayoutRequest,
        skip_if_current: bool,
    ) -> DispatchResult<Sent> {
        let worker = self.store.workers().resolve(&job.room)?;

        let mut guard = self.scheduled.lock().await;
        if skip_if_current {
            if let Some(ack) = guard.get(&job.id).filter(|ack| ack.is_current_for(job)) {
                return Ok(Sent::AlreadyCurrent(ack.clone(), guard.clone()));
            }
        }

        tracing::debug!(
            job_id = job.id,
            room = %job.room,
            worker = %worker.address(),
            start_at = %request.start_at,
            stop_at = %request.stop_at,
            "Scheduling job"
        );

        let mut ack = worker.schedule(&request).await?;
        if ack.version != job.version {
            tracing::debug!(
                job_id = job.id,
                acked = %ack.version,
                version = %job.version,
                "Worker echoed a different version"
            );
        }
        ack.room = job.room.clone();
        ack.version = job.version.clone();

        let mut next = ScheduledSet::clone(&guard);
        next.insert(job.id, ack.clone());
        let next = Arc::new(next);
        *guard = next.clone();
        drop(guard);

        self.hub.scheduled.publish(next.clone());
        Ok(Sent::Dispatched(ack, next))
    }

    /// Subscribe to upcoming sets and dispatch until shutdown.
    ///
    /// The subscription is taken before this returns.
    pub fn spawn(self: &Arc<Self>, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let upcoming = self.hub.upcoming.subscribe();
        let scheduler = Arc::clone(self);
        tokio::spawn(async move { scheduler.run(upcoming, shutdown).await })
    }

    async fn run(&self, mut upcoming: Subscription<Arc<JobSet>>, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            auto_schedule = self.config.auto_schedule,
            workers = self.store.workers().len(),
            "Dispatch scheduler started"
        );

        loop {
            tokio::select! {
                received = upcoming.recv() => {
                    let Some(set) = received else { break };
                    // a slow round may have let several updates pile up
                    let set = upcoming.latest().unwrap_or(set);
                    self.handle_upcoming(&set).await;
                }
                _ = shutdown.changed() => {
                    tracing::info!("Dispatch scheduler shutting down");
                    break;
                }
            }
        }
    }
}
