//! Shared state hub
//!
//! The [`Store`] holds the three sets every consumer reads (all jobs,
//! upcoming jobs, scheduled jobs) behind one reader/writer lock, plus the
//! long-lived worker handles. Sets are swapped wholesale, never mutated in
//! place; readers get an `Arc` to whatever set was current when they asked.
//!
//! The setters are fed by [`Store::spawn_sync`], which subscribes to the
//! three [`Hub`] topics and applies every published value.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

use crate::dispatch::WorkerPool;
use crate::models::{JobSet, ScheduledSet};
use crate::pubsub::{Hub, Subscription};

#[derive(Debug, Clone, Default)]
struct Sets {
    jobs: Arc<JobSet>,
    upcoming: Arc<JobSet>,
    scheduled: Arc<ScheduledSet>,
}

/// A consistent view of all three sets, taken under one read lock
#[derive(Debug, Clone, Serialize)]
pub struct StoreSnapshot {
    pub jobs: Arc<JobSet>,
    pub upcoming: Arc<JobSet>,
    pub scheduled: Arc<ScheduledSet>,
}

/// State hub shared by the API and the dispatch scheduler
pub struct Store {
    sets: RwLock<Sets>,
    workers: WorkerPool,
}

impl Store {
    /// Create an empty store owning the given worker handles
    pub fn new(workers: WorkerPool) -> Self {
        Self {
            sets: RwLock::new(Sets::default()),
            workers,
        }
    }

    pub fn workers(&self) -> &WorkerPool {
        &self.workers
    }

    pub async fn jobs(&self) -> Arc<JobSet> {
        self.sets.read().await.jobs.clone()
    }

    pub async fn upcoming(&self) -> Arc<JobSet> {
        self.sets.read().await.upcoming.clone()
    }

    pub async fn scheduled(&self) -> Arc<ScheduledSet> {
        self.sets.read().await.scheduled.clone()
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let sets = self.sets.read().await;
        StoreSnapshot {
            jobs: sets.jobs.clone(),
            upcoming: sets.upcoming.clone(),
            scheduled: sets.scheduled.clone(),
        }
    }

    pub async fn set_jobs(&self, jobs: Arc<JobSet>) {
        self.sets.write().await.jobs = jobs;
    }

    pub async fn set_upcoming(&self, upcoming: Arc<JobSet>) {
        self.sets.write().await.upcoming = upcoming;
    }

    pub async fn set_scheduled(&self, scheduled: Arc<ScheduledSet>) {
        self.sets.write().await.scheduled = scheduled;
    }

    /// Subscribe to the hub and apply every published set until shutdown.
    ///
    /// Subscriptions are taken before this returns, so nothing published
    /// afterwards is missed.
    pub fn spawn_sync(self: &Arc<Self>, hub: &Hub, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let jobs = hub.jobs.subscribe();
        let upcoming = hub.upcoming.subscribe();
        let scheduled = hub.scheduled.subscribe();
        let store = Arc::clone(self);

        tokio::spawn(async move { store.sync(jobs, upcoming, scheduled, shutdown).await })
    }

    async fn sync(
        &self,
        mut jobs: Subscription<Arc<JobSet>>,
        mut upcoming: Subscription<Arc<JobSet>>,
        mut scheduled: Subscription<Arc<ScheduledSet>>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                Some(set) = jobs.recv() => {
                    tracing::debug!(count = set.len(), "Store received jobs");
                    self.set_jobs(set).await;
                }
                Some(set) = upcoming.recv() => {
                    tracing::debug!(count = set.len(), "Store received upcoming jobs");
                    self.set_upcoming(set).await;
                }
                Some(set) = scheduled.recv() => {
                    tracing::debug!(count = set.len(), "Store received scheduled jobs");
                    self.set_scheduled(set).await;
                }
                _ = shutdown.changed() => {
                    tracing::info!("Store sync shutting down");
                    break;
                }
                else => break,
            }
        }
    }
}
