//! Dispatch of upcoming jobs to per-room playout workers
//!
//! # Overview
//!
//! Every time the upcoming poller publishes a new upcoming set, the
//! [`DispatchScheduler`] works out which jobs have not yet been acknowledged
//! at their current version, pads them, routes each to its room's worker
//! (or the default worker) and records the acknowledgement.
//!
//! ```text
//!   upcoming set ──► pending_jobs ──► Padding::apply ──► WorkerPool::resolve
//!                                                              │
//!        scheduled topic ◄── ScheduledSet ◄── PlayoutWorker::schedule
//! ```
//!
//! # Padding
//!
//! | Setting | Effect |
//! |---------|--------|
//! | `pre` | subtracted from the start |
//! | `max_post` | added after the end, cut to the gap before the room's next job |
//!
//! # Modules
//!
//! - [`scheduler`] - the dispatch loop and manual dispatch
//! - [`padding`] - lead/trail padding
//! - [`worker`] - worker protocol and the HTTP implementation
//! - [`pool`] - room to worker routing with default fallback
//! - [`error`] - [`DispatchError`]

pub mod error;
pub mod padding;
pub mod pool;
pub mod scheduler;
pub mod worker;

pub use error::{DispatchError, DispatchResult};
pub use padding::Padding;
pub use pool::WorkerPool;
pub use scheduler::{pending_jobs, DispatchConfig, DispatchScheduler, ManualDispatch, RoundReport};
pub use worker::{HttpWorker, PlayoutRequest, PlayoutWorker, DEFAULT_REQUEST_TIMEOUT};
