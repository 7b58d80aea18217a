//! Job diffing, reconciliation and the upcoming window
//!
//! - [`builder`] - schedule document to job set, next-in-room pointers
//! - [`reconcile`] - add/update/drop merge of a fresh set into the held one
//! - [`window`] - which jobs are imminent for a lookahead window

pub mod builder;
pub mod reconcile;
pub mod window;

pub use builder::{build_jobs, link_next_in_room};
pub use reconcile::{reconcile, ReconcileReport};
pub use window::{is_upcoming, upcoming, upcoming_at};
