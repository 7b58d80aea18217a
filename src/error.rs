//! Unified error handling for the playout controller
//!
//! Each component keeps its own error type ([`FetchError`],
//! [`DispatchError`], ...); this module folds the ones that reach the
//! command line into a single [`Error`] so `main` can report a category
//! and whether a rerun may help.
//!
//! ```rust,ignore
//! use playout_controller::error::{ControllerError, Error};
//!
//! fn report(err: &Error) {
//!     tracing::error!(category = %err.category(), recoverable = err.is_recoverable(), "{err}");
//! }
//! ```

use std::io;
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::config::ConfigError;
pub use crate::dispatch::DispatchError;
pub use crate::schedule::{DurationFormatError, FetchError};

/// Common trait for controller error types
pub trait ControllerError: std::error::Error {
    /// Check if this error is recoverable (a later attempt may succeed)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Schedule fetch and worker transport errors
    Network,
    /// Malformed documents, durations and worker responses
    Parsing,
    /// No worker for a room
    Routing,
    /// Invalid addresses and URLs
    Config,
    /// File and I/O errors
    Storage,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Routing => "routing",
            Self::Config => "config",
            Self::Storage => "storage",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for the playout controller
#[derive(Error, Debug)]
pub enum Error {
    /// Schedule retrieval errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Worker routing and dispatch errors
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ControllerError for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Dispatch(e) => e.is_recoverable(),
            Self::Io(_) | Self::Json(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(FetchError::Decode(_)) => ErrorCategory::Parsing,
            Self::Fetch(FetchError::InvalidUrl(_)) => ErrorCategory::Config,
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Json(_) => ErrorCategory::Parsing,
            Self::Dispatch(e) => match e {
                DispatchError::Routing { .. } => ErrorCategory::Routing,
                DispatchError::MalformedResponse { .. } => ErrorCategory::Parsing,
                DispatchError::InvalidAddress { .. } => ErrorCategory::Config,
                _ => ErrorCategory::Network,
            },
            Self::Io(_) => ErrorCategory::Storage,
        }
    }
}

impl Error {
    /// Find the unified error inside an `anyhow` chain, if there is one
    pub fn find_in(err: &anyhow::Error) -> Option<&Error> {
        err.chain().find_map(|cause| cause.downcast_ref::<Error>())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let fetch_err = Error::Fetch(FetchError::Status { status: 503 });
        assert_eq!(fetch_err.category(), ErrorCategory::Network);

        let decode_err = Error::Fetch(FetchError::Decode("eof".to_string()));
        assert_eq!(decode_err.category(), ErrorCategory::Parsing);

        let routing_err = Error::Dispatch(DispatchError::routing("Saal 1"));
        assert_eq!(routing_err.category(), ErrorCategory::Routing);
    }

    #[test]
    fn test_is_recoverable() {
        let fetch_err = Error::Fetch(FetchError::Status { status: 503 });
        assert!(fetch_err.is_recoverable());

        let startup_err = Error::Dispatch(DispatchError::StartupConnectivity {
            room: "Saal 1".to_string(),
            address: "http://10.0.0.1:9000".to_string(),
            reason: "connection refused".to_string(),
        });
        assert!(!startup_err.is_recoverable());
        assert_eq!(startup_err.category(), ErrorCategory::Network);

        let io_err = Error::Io(io::Error::new(io::ErrorKind::NotFound, "talks.csv"));
        assert!(!io_err.is_recoverable());
        assert_eq!(io_err.category(), ErrorCategory::Storage);
    }

    #[test]
    fn test_error_conversion() {
        let parse = serde_json::from_str::<u32>("x").unwrap_err();
        let unified: Error = parse.into();
        assert!(matches!(unified, Error::Json(_)));
        assert_eq!(unified.category(), ErrorCategory::Parsing);
    }

    #[test]
    fn test_find_in_anyhow_chain() {
        let err = anyhow::Error::new(Error::Fetch(FetchError::Status { status: 502 }))
            .context("Failed to fetch schedule");
        let found = Error::find_in(&err).unwrap();
        assert_eq!(found.category(), ErrorCategory::Network);

        assert!(Error::find_in(&anyhow::anyhow!("plain")).is_none());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Routing.to_string(), "routing");
    }
}
