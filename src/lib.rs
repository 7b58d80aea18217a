//! playout-controller - conference schedule to playout worker dispatch
//!
//! Keeps a set of playout jobs in sync with a published conference
//! schedule and hands imminent jobs to per-room playout workers.
//!
//! # Architecture
//!
//! ```text
//!  SchedulePoller ──jobs──► UpcomingPoller ──upcoming──► DispatchScheduler
//!        │                        │                             │
//!        └────────────jobs────────┴──upcoming──► Store ◄──scheduled
//!                                                  ▲
//!                                                 api
//! ```
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`schedule`] - Schedule document retrieval and parsing
//! - [`jobs`] - Job building, reconciliation and the upcoming window
//! - [`pubsub`] - Topics connecting producers and consumers
//! - [`store`] - Shared state hub
//! - [`poller`] - Timer-driven schedule and upcoming producers
//! - [`dispatch`] - Padding, worker routing and the dispatch scheduler
//! - [`lookup`] - Talk to ingest source mapping from CSV files
//! - [`api`] - HTTP API
//! - [`models`] - Core data structures and types
//!
//! # Example
//!
//! ```no_run
//! use playout_controller::jobs::{build_jobs, upcoming};
//! use playout_controller::schedule::{ScheduleFetcher, ScheduleSource};
//! use std::collections::HashMap;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher = ScheduleFetcher::new("https://fahrplan.example/schedule.json")?;
//!     let document = fetcher.fetch().await?;
//!     let sources = HashMap::from([(42, "rtmp://ingest.example/a".to_string())]);
//!     let jobs = build_jobs(&document, &sources);
//!     println!("{} upcoming", upcoming(&jobs, chrono::Duration::hours(1)).len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod jobs;
pub mod lookup;
pub mod models;
pub mod poller;
pub mod pubsub;
pub mod schedule;
pub mod store;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::dispatch::{DispatchScheduler, WorkerPool};
    pub use crate::error::{ControllerError, Error, ErrorCategory, Result};
    pub use crate::models::{JobId, JobSet, PlayoutJob, ScheduledJob, ScheduledSet};
    pub use crate::pubsub::Hub;
    pub use crate::store::Store;
}

// Direct re-exports for convenience
pub use models::{JobId, JobSet, PlayoutJob, ScheduledJob, ScheduledSet};
