// Core data structures for the playout controller

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Talk identifier as published by the schedule
pub type JobId = i64;

/// All known jobs, keyed by talk identifier
pub type JobSet = HashMap<JobId, PlayoutJob>;

/// Worker acknowledgements, keyed by talk identifier
pub type ScheduledSet = HashMap<JobId, ScheduledJob>;

/// Room name that selects the fallback worker
pub const DEFAULT_ROOM: &str = "";

/// Longest talk accepted, in hours
pub const MAX_JOB_HOURS: i64 = 24 * 7;

/// A single talk converted into a unit of playout work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoutJob {
    pub id: JobId,
    #[serde(default)]
    pub room: String, // "" = no room, routed to the default worker
    pub start: DateTime<Utc>,
    #[serde(with = "duration_secs")]
    pub duration: Duration,
    pub source: String,
    #[serde(default)]
    pub version: String,
    /// Start of the next job in the same room, `None` for the room's last job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_start: Option<DateTime<Utc>>,
}

impl PlayoutJob {
    /// Nominal end of the talk, saturating at the latest representable time
    pub fn end(&self) -> DateTime<Utc> {
        self.checked_end().unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Nominal end of the talk, `None` if it is not representable
    pub fn checked_end(&self) -> Option<DateTime<Utc>> {
        self.start.checked_add_signed(self.duration)
    }

    /// Check that the duration is non-negative, at most [`MAX_JOB_HOURS`]
    /// long and ends at a representable time.
    pub fn validate(&self) -> Result<(), String> {
        if self.duration < Duration::zero() {
            return Err(format!("job {}: negative duration", self.id));
        }
        if self.duration > Duration::hours(MAX_JOB_HOURS) {
            return Err(format!(
                "job {}: duration longer than {} hours",
                self.id, MAX_JOB_HOURS
            ));
        }
        if self.checked_end().is_none() {
            return Err(format!("job {}: end time out of range", self.id));
        }
        Ok(())
    }

    /// Gap between this job's end and the next job in the same room.
    /// Negative when the schedule overlaps.
    pub fn gap_to_next(&self) -> Option<Duration> {
        self.next_start.map(|next| next - self.end())
    }
}

/// A worker's acknowledgement that a job was accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub id: JobId,
    #[serde(default)]
    pub room: String,
    /// Opaque slot identifier assigned by the worker (a port, for example)
    #[serde(deserialize_with = "string_or_number")]
    pub handle: String,
    pub version: String,
}

impl ScheduledJob {
    /// Whether this acknowledgement still covers the given job
    pub fn is_current_for(&self, job: &PlayoutJob) -> bool {
        self.id == job.id && self.version == job.version
    }
}

/// Serialize a `chrono::Duration` as whole seconds
pub mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = i64::deserialize(d)?;
        Duration::try_seconds(secs).ok_or_else(|| serde::de::Error::custom("duration out of range"))
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Handle {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match Handle::deserialize(d)? {
        Handle::Text(s) => s,
        Handle::Int(n) => n.to_string(),
        Handle::Uint(n) => n.to_string(),
    })
}
