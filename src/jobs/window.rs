//! Upcoming window calculation

use chrono::{DateTime, Duration, Utc};

use crate::models::{JobSet, PlayoutJob};

/// Whether a job is imminent at `now` for the given lookahead.
///
/// A job qualifies if it starts in `(now, now + lookahead]` or is running,
/// i.e. `start <= now < start + duration`. The upper bound of the window is
/// inclusive.
pub fn is_upcoming(job: &PlayoutJob, lookahead: Duration, now: DateTime<Utc>) -> bool {
    let starts_soon = now < job.start && job.start <= now + lookahead;
    let running = job.start <= now && now < job.end();
    starts_soon || running
}

/// The subset of `jobs` that is imminent at `now`
pub fn upcoming_at(jobs: &JobSet, lookahead: Duration, now: DateTime<Utc>) -> JobSet {
    jobs.iter()
        .filter(|(_, job)| is_upcoming(job, lookahead, now))
        .map(|(id, job)| (*id, job.clone()))
        .collect()
}

/// The subset of `jobs` that is imminent right now
pub fn upcoming(jobs: &JobSet, lookahead: Duration) -> JobSet {
    upcoming_at(jobs, lookahead, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 27, 12, 0, 0).unwrap()
    }

    fn job_at(offset_min: i64, duration_min: i64) -> PlayoutJob {
        PlayoutJob {
            id: offset_min,
            room: "A".to_string(),
            start: now() + Duration::minutes(offset_min),
            duration: Duration::minutes(duration_min),
            source: "rtmp://ingest/a".to_string(),
            version: "v1".to_string(),
            next_start: None,
        }
    }

    #[test]
    fn test_window_boundaries() {
        let w = Duration::minutes(60);

        // upper bound is inclusive
        assert!(is_upcoming(&job_at(60, 30), w, now()));
        assert!(!is_upcoming(&job_at(61, 30), w, now()));

        // starting exactly now counts as running
        assert!(is_upcoming(&job_at(0, 30), w, now()));

        // running job
        assert!(is_upcoming(&job_at(-10, 30), w, now()));

        // just finished
        assert!(!is_upcoming(&job_at(-30, 30), w, now()));
    }

    #[test]
    fn test_zero_duration_job_at_now_is_excluded() {
        assert!(!is_upcoming(&job_at(0, 0), Duration::minutes(60), now()));
    }

    #[test]
    fn test_upcoming_at_filters_set() {
        let jobs: JobSet = [job_at(-120, 30), job_at(-5, 30), job_at(30, 30), job_at(90, 30)]
            .into_iter()
            .map(|j| (j.id, j))
            .collect();

        let mut ids: Vec<_> = upcoming_at(&jobs, Duration::minutes(60), now())
            .into_keys()
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![-5, 30]);
    }
}
