//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use std::sync::Mutex;
use std::time::Duration as StdDuration;

use playout_controller::dispatch::{DispatchError, DispatchResult, PlayoutRequest, PlayoutWorker};
use playout_controller::models::{JobId, JobSet, PlayoutJob, ScheduledJob};

/// Fixed reference instant for window arithmetic
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 27, 12, 0, 0).unwrap()
}

/// Create a job with default values
pub fn create_test_job(id: JobId, room: &str, start: DateTime<Utc>, minutes: i64) -> PlayoutJob {
    PlayoutJob {
        id,
        room: room.to_string(),
        start,
        duration: Duration::minutes(minutes),
        source: format!("rtmp://ingest.example/{id}"),
        version: "v1".to_string(),
        next_start: None,
    }
}

pub fn job_set(jobs: impl IntoIterator<Item = PlayoutJob>) -> JobSet {
    jobs.into_iter().map(|j| (j.id, j)).collect()
}

/// A talk entry for [`schedule_json`]
pub struct TalkFixture {
    pub id: JobId,
    pub room: &'static str,
    pub start: DateTime<Utc>,
    pub duration: &'static str,
}

pub fn talk(id: JobId, room: &'static str, start: DateTime<Utc>, duration: &'static str) -> TalkFixture {
    TalkFixture {
        id,
        room,
        start,
        duration,
    }
}

/// Build a one-day schedule document
pub fn schedule_json(version: &str, talks: &[TalkFixture]) -> serde_json::Value {
    let mut rooms = serde_json::Map::new();
    for t in talks {
        let entry = rooms
            .entry(t.room.to_string())
            .or_insert_with(|| json!([]));
        if let Some(list) = entry.as_array_mut() {
            list.push(json!({
                "id": t.id,
                "date": t.start.to_rfc3339(),
                "duration": t.duration,
                "title": format!("Talk {}", t.id),
            }));
        }
    }

    json!({
        "schedule": {
            "version": version,
            "conference": {
                "acronym": "test",
                "days": [{ "index": 1, "rooms": rooms }]
            }
        }
    })
}

/// In-process worker recording every request it gets
#[derive(Default)]
pub struct RecordingWorker {
    pub name: String,
    pub failing: Vec<JobId>,
    pub requests: Mutex<Vec<PlayoutRequest>>,
}

impl RecordingWorker {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn failing(name: &str, ids: &[JobId]) -> Self {
        Self {
            name: name.to_string(),
            failing: ids.to_vec(),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<PlayoutRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_ids(&self) -> Vec<JobId> {
        self.requests().iter().map(|r| r.id).collect()
    }
}

#[async_trait]
impl PlayoutWorker for RecordingWorker {
    fn address(&self) -> &str {
        &self.name
    }

    async fn probe(&self) -> DispatchResult<()> {
        Ok(())
    }

    async fn schedule(&self, request: &PlayoutRequest) -> DispatchResult<ScheduledJob> {
        self.requests.lock().unwrap().push(request.clone());
        if self.failing.contains(&request.id) {
            return Err(DispatchError::Rejected {
                job_id: request.id,
                status: 500,
                message: "no free slot".to_string(),
            });
        }
        Ok(ScheduledJob {
            id: request.id,
            room: String::new(),
            handle: format!("{}-{}", self.name, request.id),
            version: request.version.clone(),
        })
    }
}

/// Poll `check` until it holds or two seconds pass
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return true;
        }
        tokio::time::sleep(StdDuration::from_millis(10)).await;
    }
    false
}
