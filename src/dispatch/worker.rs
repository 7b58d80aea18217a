//! Per-room playout worker protocol
//!
//! A worker accepts a [`PlayoutRequest`] and answers with a
//! [`ScheduledJob`] acknowledgement. [`HttpWorker`] speaks JSON over HTTP:
//! `POST {address}/schedulePlayout`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::error::{DispatchError, DispatchResult};
use crate::models::{JobId, PlayoutJob, ScheduledJob};

/// Default bound on a single dispatch request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// What a worker is asked to play out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayoutRequest {
    pub id: JobId,
    pub start_at: DateTime<Utc>,
    pub stop_at: DateTime<Utc>,
    pub source: String,
    pub version: String,
}

impl PlayoutRequest {
    /// The job's nominal slot, without any padding
    pub fn nominal(job: &PlayoutJob) -> Self {
        Self {
            id: job.id,
            start_at: job.start,
            stop_at: job.end(),
            source: job.source.clone(),
            version: job.version.clone(),
        }
    }
}

/// A playout worker reachable from the controller
#[async_trait]
pub trait PlayoutWorker: Send + Sync {
    /// Where the worker lives, for logs
    fn address(&self) -> &str;

    /// Check that the worker can be reached at all
    async fn probe(&self) -> DispatchResult<()>;

    /// Hand a job to the worker and return its acknowledgement
    async fn schedule(&self, request: &PlayoutRequest) -> DispatchResult<ScheduledJob>;
}

/// Worker reached over HTTP+JSON
pub struct HttpWorker {
    client: Client,
    address: String,
    base: Url,
    endpoint: Url,
}

impl HttpWorker {
    /// Create a worker client with the default 5 second timeout
    pub fn new(room: &str, address: &str) -> DispatchResult<Self> {
        Self::with_timeout(room, address, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a worker client with a custom request timeout
    pub fn with_timeout(room: &str, address: &str, timeout: Duration) -> DispatchResult<Self> {
        let invalid = || DispatchError::InvalidAddress {
            room: room.to_string(),
            address: address.to_string(),
        };

        let base = Url::parse(address).map_err(|_| invalid())?;
        let mut endpoint = base.clone();
        endpoint
            .path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push("schedulePlayout");

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::StartupConnectivity {
                room: room.to_string(),
                address: address.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            address: address.to_string(),
            base,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl PlayoutWorker for HttpWorker {
    fn address(&self) -> &str {
        &self.address
    }

    async fn probe(&self) -> DispatchResult<()> {
        // Any HTTP answer means the worker is up.
        self.client
            .get(self.base.clone())
            .send()
            .await
            .map(|_| ())
            .map_err(|e| DispatchError::StartupConnectivity {
                room: String::new(),
                address: self.address.clone(),
                reason: e.to_string(),
            })
    }

    async fn schedule(&self, request: &PlayoutRequest) -> DispatchResult<ScheduledJob> {
        let job_id = request.id;

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DispatchError::Timeout { job_id }
                } else {
                    DispatchError::Transport {
                        job_id,
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                DispatchError::Timeout { job_id }
            } else {
                DispatchError::Transport {
                    job_id,
                    reason: e.to_string(),
                }
            }
        })?;

        if !status.is_success() {
            return Err(DispatchError::Rejected {
                job_id,
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).trim().to_string(),
            });
        }

        parse_acknowledgement(job_id, &body)
    }
}

/// Decode and sanity-check a worker acknowledgement
pub fn parse_acknowledgement(job_id: JobId, body: &[u8]) -> DispatchResult<ScheduledJob> {
    let malformed = |reason: String| DispatchError::MalformedResponse { job_id, reason };

    let ack: ScheduledJob = serde_json::from_slice(body).map_err(|e| malformed(e.to_string()))?;
    if ack.id != job_id {
        return Err(malformed(format!("acknowledged job {} instead", ack.id)));
    }
    Ok(ack)
}
