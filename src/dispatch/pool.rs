//! Room to worker routing

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use super::error::{DispatchError, DispatchResult};
use super::worker::{HttpWorker, PlayoutWorker};
use crate::models::DEFAULT_ROOM;

/// Long-lived worker handles keyed by room name.
///
/// The empty room name holds the default worker used for rooms without one
/// of their own. Handles are created once and only read afterwards.
#[derive(Clone, Default)]
pub struct WorkerPool {
    workers: HashMap<String, Arc<dyn PlayoutWorker>>,
}

impl WorkerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build HTTP workers for every configured room and probe each one.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidAddress` or
    /// `DispatchError::StartupConnectivity` for the first worker that cannot
    /// be used. The caller is expected to treat this as fatal.
    pub async fn connect(
        addresses: &BTreeMap<String, String>,
        timeout: Duration,
    ) -> DispatchResult<Self> {
        let mut pool = Self::new();

        for (room, address) in addresses {
            let worker = HttpWorker::with_timeout(room, address, timeout)?;
            worker.probe().await.map_err(|e| match e {
                DispatchError::StartupConnectivity { address, reason, .. } => {
                    DispatchError::StartupConnectivity {
                        room: room.clone(),
                        address,
                        reason,
                    }
                }
                other => other,
            })?;

            tracing::info!(room = %room, address = %address, "Connected playout worker");
            pool.insert(room.clone(), Arc::new(worker));
        }

        Ok(pool)
    }

    /// Register a worker for a room, replacing any previous one
    pub fn insert(&mut self, room: impl Into<String>, worker: Arc<dyn PlayoutWorker>) {
        self.workers.insert(room.into(), worker);
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with_worker(mut self, room: impl Into<String>, worker: Arc<dyn PlayoutWorker>) -> Self {
        self.insert(room, worker);
        self
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn has_default(&self) -> bool {
        self.workers.contains_key(DEFAULT_ROOM)
    }

    /// Configured room names, sorted
    pub fn rooms(&self) -> Vec<String> {
        let mut rooms: Vec<_> = self.workers.keys().cloned().collect();
        rooms.sort();
        rooms
    }

    /// The worker for `room`, falling back to the default worker
    pub fn resolve(&self, room: &str) -> DispatchResult<Arc<dyn PlayoutWorker>> {
        if let Some(worker) = self.workers.get(room) {
            return Ok(worker.clone());
        }

        match self.workers.get(DEFAULT_ROOM) {
            Some(worker) => {
                tracing::debug!(room = %room, "No worker for room, using default worker");
                Ok(worker.clone())
            }
            None => Err(DispatchError::routing(room)),
        }
    }
}
