//! Error types for schedule retrieval and parsing

use thiserror::Error;

/// Errors that can occur while retrieving the schedule document
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network failure before a response was received
    #[error("schedule request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response status outside 2xx
    #[error("schedule server answered {status}")]
    Status { status: u16 },

    /// Body is not a schedule document
    #[error("cannot decode schedule document: {0}")]
    Decode(String),

    /// Schedule URL could not be parsed
    #[error("invalid schedule URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Every fetch failure is retried on the next poll except a broken URL
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidUrl(_))
    }
}

/// A talk duration that is not of the form `H:MM`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot parse duration '{value}': {reason}")]
pub struct DurationFormatError {
    pub value: String,
    pub reason: String,
}

impl DurationFormatError {
    pub fn new(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status { status: 503 };
        assert!(err.to_string().contains("503"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_invalid_url_not_recoverable() {
        assert!(!FetchError::InvalidUrl("nope".into()).is_recoverable());
    }

    #[test]
    fn test_duration_error_message() {
        let err = DurationFormatError::new("1:2:3", "expected H:MM");
        assert_eq!(err.to_string(), "cannot parse duration '1:2:3': expected H:MM");
    }
}
