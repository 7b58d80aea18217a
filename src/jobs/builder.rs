//! Conversion of a schedule document into a job set

use std::collections::HashMap;

use crate::models::{JobId, JobSet, PlayoutJob};
use crate::schedule::{parse_talk_duration, ScheduleDocument};

/// Build the job set for a schedule document.
///
/// Talks without an entry in `sources` have no known ingest and are left
/// out. Talks with an unparseable or out-of-range duration are logged and
/// skipped. Every
/// job carries the document's version and its room's next-start pointer.
pub fn build_jobs(document: &ScheduleDocument, sources: &HashMap<JobId, String>) -> JobSet {
    let version = document.version();
    let mut jobs = JobSet::new();

    for (room, talk) in document.talks() {
        let Some(source) = sources.get(&talk.id) else {
            continue;
        };

        let duration = match parse_talk_duration(&talk.duration) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(talk_id = talk.id, room = %room, error = %e, "Skipping talk");
                continue;
            }
        };

        let job = PlayoutJob {
            id: talk.id,
            room: room.to_string(),
            start: talk.date,
            duration,
            source: source.clone(),
            version: version.to_string(),
            next_start: None,
        };
        if let Err(reason) = job.validate() {
            tracing::warn!(talk_id = talk.id, room = %room, %reason, "Skipping talk");
            continue;
        }

        jobs.insert(talk.id, job);
    }

    link_next_in_room(&mut jobs);
    jobs
}

/// Point every job at the start of the following job in its room.
///
/// Rooms are ordered by start time, ties broken by identifier. Jobs that
/// share a start time both point at the next strictly later start.
pub fn link_next_in_room(jobs: &mut JobSet) {
    let mut rooms: HashMap<&str, Vec<(chrono::DateTime<chrono::Utc>, JobId)>> = HashMap::new();
    for job in jobs.values() {
        rooms.entry(job.room.as_str()).or_default().push((job.start, job.id));
    }

    let mut links: Vec<(JobId, Option<chrono::DateTime<chrono::Utc>>)> =
        Vec::with_capacity(jobs.len());
    for order in rooms.values_mut() {
        order.sort();
        for (i, (start, id)) in order.iter().enumerate() {
            let next = order[i + 1..]
                .iter()
                .map(|(s, _)| *s)
                .find(|s| s > start);
            links.push((*id, next));
        }
    }

    for (id, next) in links {
        if let Some(job) = jobs.get_mut(&id) {
            job.next_start = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{Conference, Day, Schedule, Talk};
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn talk(id: i64, hour: u32, duration: &str) -> Talk {
        Talk {
            id,
            date: Utc.with_ymd_and_hms(2024, 12, 27, hour, 0, 0).unwrap(),
            duration: duration.to_string(),
            title: format!("Talk {id}"),
        }
    }

    fn document(rooms: Vec<(&str, Vec<Talk>)>) -> ScheduleDocument {
        let rooms: BTreeMap<String, Vec<Talk>> =
            rooms.into_iter().map(|(r, t)| (r.to_string(), t)).collect();
        ScheduleDocument {
            schedule: Schedule {
                version: "v1".to_string(),
                conference: Conference {
                    acronym: "test".to_string(),
                    days: vec![Day { index: 0, rooms }],
                },
            },
        }
    }

    fn sources(ids: &[i64]) -> HashMap<JobId, String> {
        ids.iter().map(|id| (*id, format!("rtmp://ingest/{id}"))).collect()
    }

    #[test]
    fn test_unknown_source_is_excluded() {
        let doc = document(vec![("A", vec![talk(4, 10, "0:30"), talk(5, 11, "0:30")])]);
        let jobs = build_jobs(&doc, &sources(&[4]));

        assert!(jobs.contains_key(&4));
        assert!(!jobs.contains_key(&5));
    }

    #[test]
    fn test_bad_duration_skips_only_that_talk() {
        let doc = document(vec![("A", vec![talk(1, 10, "30"), talk(2, 11, "0:45")])]);
        let jobs = build_jobs(&doc, &sources(&[1, 2]));

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[&2].duration, Duration::minutes(45));
    }

    #[test]
    fn test_out_of_range_duration_skips_only_that_talk() {
        let mut late = talk(3, 10, "1:00");
        late.date = chrono::DateTime::<Utc>::MAX_UTC - Duration::minutes(10);
        let doc = document(vec![(
            "A",
            vec![talk(1, 10, "9999999999:00"), talk(2, 11, "0:45"), late],
        )]);
        let jobs = build_jobs(&doc, &sources(&[1, 2, 3]));

        assert_eq!(jobs.keys().copied().collect::<Vec<_>>(), vec![2]);

        let now = Utc.with_ymd_and_hms(2024, 12, 27, 10, 30, 0).unwrap();
        let upcoming = crate::jobs::upcoming_at(&jobs, Duration::hours(1), now);
        assert!(upcoming.contains_key(&2));
    }

    #[test]
    fn test_job_fields_copied() {
        let doc = document(vec![("Ada", vec![talk(7, 10, "1:15")])]);
        let jobs = build_jobs(&doc, &sources(&[7]));
        let job = &jobs[&7];

        assert_eq!(job.room, "Ada");
        assert_eq!(job.version, "v1");
        assert_eq!(job.source, "rtmp://ingest/7");
        assert_eq!(job.duration, Duration::minutes(75));
    }

    #[test]
    fn test_next_in_room_chain() {
        let doc = document(vec![
            ("A", vec![talk(3, 14, "0:30"), talk(1, 10, "0:30"), talk(2, 12, "0:30")]),
            ("B", vec![talk(9, 11, "0:30")]),
        ]);
        let jobs = build_jobs(&doc, &sources(&[1, 2, 3, 9]));

        assert_eq!(jobs[&1].next_start, Some(jobs[&2].start));
        assert_eq!(jobs[&2].next_start, Some(jobs[&3].start));
        assert_eq!(jobs[&3].next_start, None);
        assert_eq!(jobs[&9].next_start, None);
    }

    #[test]
    fn test_equal_start_never_links_to_itself() {
        let doc = document(vec![("A", vec![talk(1, 10, "0:30"), talk(2, 10, "0:30"), talk(3, 12, "0:30")])]);
        let jobs = build_jobs(&doc, &sources(&[1, 2, 3]));

        for job in jobs.values() {
            if let Some(next) = job.next_start {
                assert!(next > job.start);
            }
        }
        assert_eq!(jobs[&1].next_start, Some(jobs[&3].start));
        assert_eq!(jobs[&2].next_start, Some(jobs[&3].start));
    }
}
