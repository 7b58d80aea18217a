//! Timer-driven producers
//!
//! Two independent tasks feed the [`Hub`](crate::pubsub::Hub):
//!
//! - [`SchedulePoller`] fetches the schedule on a fixed interval and
//!   publishes the job set to `jobs` whenever the document version moves
//!   (and once at startup).
//! - [`UpcomingPoller`] recomputes the upcoming window from the latest job
//!   set and publishes it to `upcoming` on every tick.
//!
//! Both stop when the shared `watch` shutdown flag flips.

pub mod schedule_poller;
pub mod upcoming_poller;

pub use schedule_poller::{PollOutcome, SchedulePoller};
pub use upcoming_poller::{poll_interval, UpcomingPoller};
