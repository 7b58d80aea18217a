//! Integration tests for ScheduleFetcher using wiremock
//!
//! These tests validate the schedule source adapter against a mock
//! schedule server.

mod common;

use common::{reference_now, schedule_json, talk};
use playout_controller::schedule::{FetchError, ScheduleFetcher, ScheduleSource};
use std::collections::HashMap;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(server: &MockServer) -> ScheduleFetcher {
    ScheduleFetcher::with_timeout(&format!("{}/schedule.json", server.uri()), Duration::from_secs(2))
        .unwrap()
}

/// Test successful fetch from mock server
#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;
    let body = schedule_json(
        "1.3",
        &[
            talk(11, "Saal 1", reference_now(), "0:30"),
            talk(12, "Saal 2", reference_now(), "1:00"),
        ],
    );

    Mock::given(method("GET"))
        .and(path("/schedule.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let document = fetcher(&mock_server).fetch().await.unwrap();
    assert_eq!(document.version(), "1.3");

    let mut rooms: Vec<_> = document.talks().map(|(room, t)| (room.to_string(), t.id)).collect();
    rooms.sort();
    assert_eq!(
        rooms,
        vec![("Saal 1".to_string(), 11), ("Saal 2".to_string(), 12)]
    );
}

/// Non-2xx answers map to a status error and are not retried here
#[tokio::test]
async fn test_404_is_status_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/schedule.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = fetcher(&mock_server).fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404 }));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_garbage_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/schedule.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let err = fetcher(&mock_server).fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn test_slow_server_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/schedule.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(schedule_json("1", &[]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let fetcher = ScheduleFetcher::with_timeout(
        &format!("{}/schedule.json", mock_server.uri()),
        Duration::from_millis(200),
    )
    .unwrap();

    let err = fetcher.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
}

/// Bad talk durations do not fail the fetch; they are dropped when jobs are built
#[tokio::test]
async fn test_bad_duration_survives_fetch() {
    let mock_server = MockServer::start().await;
    let body = schedule_json(
        "2",
        &[
            talk(1, "Saal 1", reference_now(), "0:30"),
            talk(2, "Saal 1", reference_now(), "1:00:00"),
        ],
    );

    Mock::given(method("GET"))
        .and(path("/schedule.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let document = fetcher(&mock_server).fetch().await.unwrap();
    assert_eq!(document.talks().count(), 2);

    let sources: HashMap<_, _> = [(1, "rtmp://a".to_string()), (2, "rtmp://b".to_string())]
        .into_iter()
        .collect();
    let jobs = playout_controller::jobs::build_jobs(&document, &sources);
    assert_eq!(jobs.len(), 1);
    assert!(jobs.contains_key(&1));
}
