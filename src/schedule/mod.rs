//! Schedule source adapter
//!
//! Retrieves the externally published conference schedule and parses the
//! pieces the controller relies on: the document version, each talk's
//! room, start time and `H:MM` duration.
//!
//! - [`fetcher`] - HTTP retrieval behind the [`ScheduleSource`] trait
//! - [`document`] - serde model of the schedule document
//! - [`duration`] - `H:MM` duration parsing
//! - [`error`] - [`FetchError`] and [`DurationFormatError`]

pub mod document;
pub mod duration;
pub mod error;
pub mod fetcher;

pub use document::{Conference, Day, Schedule, ScheduleDocument, Talk};
pub use duration::parse_talk_duration;
pub use error::{DurationFormatError, FetchError};
pub use fetcher::{ScheduleFetcher, ScheduleSource};
