//! Schedule document structure
//!
//! Only the fields the controller needs are modelled; everything else in the
//! published document is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level schedule document (`{"schedule": {...}}`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleDocument {
    pub schedule: Schedule,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Changes whenever the schedule is republished with different content
    pub version: String,

    #[serde(default)]
    pub conference: Conference,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conference {
    #[serde(default)]
    pub acronym: String,

    #[serde(default)]
    pub days: Vec<Day>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Day {
    #[serde(default)]
    pub index: u32,

    /// Room name to talks in that room
    #[serde(default)]
    pub rooms: BTreeMap<String, Vec<Talk>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Talk {
    pub id: i64,
    pub date: DateTime<Utc>,
    /// `H:MM`
    pub duration: String,
    #[serde(default)]
    pub title: String,
}

impl ScheduleDocument {
    pub fn version(&self) -> &str {
        &self.schedule.version
    }

    /// Every talk of every day, paired with its room name
    pub fn talks(&self) -> impl Iterator<Item = (&str, &Talk)> {
        self.schedule.conference.days.iter().flat_map(|day| {
            day.rooms
                .iter()
                .flat_map(|(room, talks)| talks.iter().map(move |t| (room.as_str(), t)))
        })
    }
}
