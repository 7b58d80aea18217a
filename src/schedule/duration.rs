//! Talk duration parsing

use chrono::Duration;

use super::error::DurationFormatError;
use crate::models::MAX_JOB_HOURS;

/// Parse a schedule duration of the form `H:MM` (for example `0:45` or `1:30`).
///
/// The string must split on `:` into exactly two non-negative integers,
/// with minutes below 60 and hours at most [`MAX_JOB_HOURS`].
pub fn parse_talk_duration(value: &str) -> Result<Duration, DurationFormatError> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    if parts.len() != 2 {
        return Err(DurationFormatError::new(
            value,
            format!("expected H:MM, got {} component(s)", parts.len()),
        ));
    }

    let hours: i64 = parts[0]
        .parse()
        .map_err(|e| DurationFormatError::new(value, format!("hour part: {e}")))?;
    let minutes: i64 = parts[1]
        .parse()
        .map_err(|e| DurationFormatError::new(value, format!("minute part: {e}")))?;

    if hours < 0 || minutes < 0 {
        return Err(DurationFormatError::new(value, "negative component"));
    }
    if minutes >= 60 {
        return Err(DurationFormatError::new(value, "minutes must be below 60"));
    }
    if hours > MAX_JOB_HOURS {
        return Err(DurationFormatError::new(
            value,
            format!("longer than {MAX_JOB_HOURS} hours"),
        ));
    }

    Duration::try_hours(hours)
        .zip(Duration::try_minutes(minutes))
        .and_then(|(h, m)| h.checked_add(&m))
        .ok_or_else(|| DurationFormatError::new(value, "out of range"))
}
