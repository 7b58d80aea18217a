//! Error types for job dispatch

use std::fmt;

use crate::models::JobId;

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Dispatch-specific errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No worker for the room and no default worker
    Routing { room: String },

    /// Worker did not answer within the request timeout
    Timeout { job_id: JobId },

    /// Connection-level failure talking to the worker
    Transport { job_id: JobId, reason: String },

    /// Worker answered with a non-success status
    Rejected {
        job_id: JobId,
        status: u16,
        message: String,
    },

    /// Worker answered 2xx with something that is not an acknowledgement
    MalformedResponse { job_id: JobId, reason: String },

    /// A configured worker address is not a usable URL
    InvalidAddress { room: String, address: String },

    /// A configured worker was unreachable at startup
    StartupConnectivity {
        room: String,
        address: String,
        reason: String,
    },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Routing { room } => {
                write!(f, "No worker for room '{}' and no default worker", room)
            }
            Self::Timeout { job_id } => {
                write!(f, "Worker timed out scheduling job {}", job_id)
            }
            Self::Transport { job_id, reason } => {
                write!(f, "Request for job {} failed: {}", job_id, reason)
            }
            Self::Rejected {
                job_id,
                status,
                message,
            } => {
                write!(f, "Worker rejected job {} ({}): {}", job_id, status, message)
            }
            Self::MalformedResponse { job_id, reason } => {
                write!(f, "Malformed acknowledgement for job {}: {}", job_id, reason)
            }
            Self::InvalidAddress { room, address } => {
                write!(f, "Invalid worker address '{}' for room '{}'", address, room)
            }
            Self::StartupConnectivity {
                room,
                address,
                reason,
            } => {
                write!(
                    f,
                    "Worker for room '{}' at {} unreachable: {}",
                    room, address, reason
                )
            }
        }
    }
}

impl std::error::Error for DispatchError {}

impl DispatchError {
    /// Create a routing error
    pub fn routing(room: impl Into<String>) -> Self {
        Self::Routing { room: room.into() }
    }

    /// Whether the job may succeed on a later round
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::InvalidAddress { .. } | Self::StartupConnectivity { .. }
        )
    }

    /// Whether this is a routing miss rather than a worker failure
    pub fn is_routing(&self) -> bool {
        matches!(self, Self::Routing { .. })
    }
}
