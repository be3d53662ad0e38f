//! Integration tests for the backend client.
//!
//! These tests use wiremock to simulate the mosque backend responses
//! and verify correct parsing and error handling.

use chrono::NaiveDate;
use mosque_display::{DisplayError, api::BackendClient, config::NetworkConfig, prayer::PrayerKey};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const PRAYER_TIMES: &str = r#"{
    "date": "2026-02-18",
    "hijri": "1 Ramadan 1447 H",
    "subuh": "04:21",
    "terbit": "05:35",
    "dhuha": "06:01",
    "dzuhur": "11:50",
    "ashar": "15:01",
    "maghrib": "17:58",
    "isya": "19:08"
}"#;

const SETTINGS: &str = r#"{
    "iqomah_subuh": 15,
    "iqomah_dzuhur": 10,
    "iqomah_ashar": 10,
    "iqomah_maghrib": 5,
    "iqomah_isya": 10,
    "bell_enabled": true,
    "bell_before_minutes": 3
}"#;

const IDENTITY: &str = r#"{
    "name": "Masjid Muktamirin",
    "address": "Kec. Galur, Kab. Kulon Progo",
    "timezone_offset": 7
}"#;

fn test_config() -> NetworkConfig {
    NetworkConfig {
        request_timeout_secs: 10,
        connect_timeout_secs: 5,
    }
}

async fn mount_json(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Test successful prayer times parsing.
#[tokio::test]
async fn test_fetch_prayer_times_success() {
    let mock_server = MockServer::start().await;
    mount_json(&mock_server, "/api/prayer-times", PRAYER_TIMES).await;

    let client =
        BackendClient::new(mock_server.uri(), &test_config()).expect("Client creation should succeed");

    let response = client.fetch_prayer_times(None).await.unwrap();
    let times = response.time_set();

    assert_eq!(response.for_date(), NaiveDate::from_ymd_opt(2026, 2, 18));
    assert_eq!(times.get(PrayerKey::Subuh), Some("04:21"));
    assert_eq!(times.get(PrayerKey::Isya), Some("19:08"));
    assert!(times.is_complete());
}

/// Test the date query parameter is passed through.
#[tokio::test]
async fn test_fetch_prayer_times_for_date() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/prayer-times"))
        .and(query_param("date", "2026-03-20"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{ "date": "2026-03-20", "subuh": "04:25" }"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = BackendClient::new(mock_server.uri(), &test_config()).unwrap();
    let response = client
        .fetch_prayer_times(NaiveDate::from_ymd_opt(2026, 3, 20))
        .await
        .unwrap();

    assert_eq!(response.time_set().get(PrayerKey::Subuh), Some("04:25"));
    assert!(!response.time_set().is_complete());
}

/// Test a trailing slash on the base URL does not double up.
#[tokio::test]
async fn test_base_url_trailing_slash() {
    let mock_server = MockServer::start().await;
    mount_json(&mock_server, "/api/settings/prayer", SETTINGS).await;

    let client = BackendClient::new(format!("{}/", mock_server.uri()), &test_config()).unwrap();
    assert!(client.fetch_prayer_settings().await.is_ok());
}

/// Test settings parsing.
#[tokio::test]
async fn test_fetch_prayer_settings() {
    let mock_server = MockServer::start().await;
    mount_json(&mock_server, "/api/settings/prayer", SETTINGS).await;

    let client = BackendClient::new(mock_server.uri(), &test_config()).unwrap();
    let response = client.fetch_prayer_settings().await.unwrap();

    assert_eq!(response.iqomah_maghrib, 5);
    assert_eq!(response.bell_before_minutes, 3);
}

/// Test mosque identity parsing.
#[tokio::test]
async fn test_fetch_mosque_identity() {
    let mock_server = MockServer::start().await;
    mount_json(&mock_server, "/api/mosque/identity", IDENTITY).await;

    let client = BackendClient::new(mock_server.uri(), &test_config()).unwrap();
    let identity = client.fetch_mosque_identity().await.unwrap();

    assert_eq!(identity.name, "Masjid Muktamirin");
    assert_eq!(identity.timezone_offset, Some(7));
}

/// Test monthly schedule parsing with query parameters.
#[tokio::test]
async fn test_fetch_monthly_schedule() {
    let mock_server = MockServer::start().await;

    let body = r#"{
        "month": 2,
        "year": 2026,
        "schedule": [
            { "day": 18, "subuh": "04:21", "terbit": "05:35", "dhuha": "06:01",
              "dzuhur": "11:50", "ashar": "15:01", "maghrib": "17:58", "isya": "19:08" }
        ]
    }"#;

    Mock::given(method("GET"))
        .and(path("/api/prayer-times/monthly"))
        .and(query_param("month", "2"))
        .and(query_param("year", "2026"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;

    let client = BackendClient::new(mock_server.uri(), &test_config()).unwrap();
    let response = client.fetch_monthly_schedule(2, 2026).await.unwrap();

    assert_eq!(response.month, 2);
    assert_eq!(response.schedule.len(), 1);
    assert!(response.error.is_none());
    assert_eq!(response.schedule[0].time_set().get(PrayerKey::Dhuha), Some("06:01"));
}

/// Test the combined snapshot.
#[tokio::test]
async fn test_fetch_snapshot() {
    let mock_server = MockServer::start().await;
    mount_json(&mock_server, "/api/prayer-times", PRAYER_TIMES).await;
    mount_json(&mock_server, "/api/settings/prayer", SETTINGS).await;
    mount_json(&mock_server, "/api/mosque/identity", IDENTITY).await;

    let client = BackendClient::new(mock_server.uri(), &test_config()).unwrap();
    let snapshot = client.fetch_snapshot(None).await.unwrap();

    assert_eq!(snapshot.for_date, NaiveDate::from_ymd_opt(2026, 2, 18));
    assert!(snapshot.prayer_times.is_complete());
    assert_eq!(snapshot.settings.bell_before_minutes, 3);
    assert_eq!(snapshot.settings.iqomah_minutes(PrayerKey::Subuh), 15);
    assert_eq!(snapshot.identity.name, "Masjid Muktamirin");
}

/// Test that the snapshot asks for the board's day and keeps that day.
#[tokio::test]
async fn test_fetch_snapshot_for_requested_date() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/prayer-times"))
        .and(query_param("date", "2026-02-19"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRAYER_TIMES))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_json(&mock_server, "/api/settings/prayer", SETTINGS).await;
    mount_json(&mock_server, "/api/mosque/identity", IDENTITY).await;

    let client = BackendClient::new(mock_server.uri(), &test_config()).unwrap();
    let requested = NaiveDate::from_ymd_opt(2026, 2, 19).unwrap();
    let snapshot = client.fetch_snapshot(Some(requested)).await.unwrap();

    // The body still says 2026-02-18.
    assert_eq!(snapshot.for_date, Some(requested));
}

/// Test that an unreadable body is reported as a validation error.
#[tokio::test]
async fn test_unreadable_snapshot_is_validation_error() {
    let mock_server = MockServer::start().await;
    mount_json(&mock_server, "/api/prayer-times", "{ not json").await;
    mount_json(&mock_server, "/api/settings/prayer", SETTINGS).await;
    mount_json(&mock_server, "/api/mosque/identity", IDENTITY).await;

    let client = BackendClient::new(mock_server.uri(), &test_config()).unwrap();
    let err = client.fetch_snapshot(None).await.unwrap_err();

    assert!(matches!(DisplayError::from_refresh(&err), DisplayError::Validation(_)));
}

/// Test that one failing endpoint fails the whole snapshot.
#[tokio::test]
async fn test_fetch_snapshot_fails_when_settings_fail() {
    let mock_server = MockServer::start().await;
    mount_json(&mock_server, "/api/prayer-times", PRAYER_TIMES).await;
    mount_json(&mock_server, "/api/mosque/identity", IDENTITY).await;

    Mock::given(method("GET"))
        .and(path("/api/settings/prayer"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = BackendClient::new(mock_server.uri(), &test_config()).unwrap();
    let err = client.fetch_snapshot(None).await.unwrap_err();

    assert!(err.to_string().contains("503"));
}

/// Test handling of server error (500).
#[tokio::test]
async fn test_fetch_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/prayer-times"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = BackendClient::new(mock_server.uri(), &test_config()).unwrap();
    let result = client.fetch_prayer_times(None).await;

    assert!(result.is_err(), "Should fail on 500 error");
    let err = result.unwrap_err().to_string();
    assert!(err.contains("500"), "Error should mention status code");
}

/// Test handling of not found (404).
#[tokio::test]
async fn test_fetch_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/mosque/identity"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = BackendClient::new(mock_server.uri(), &test_config()).unwrap();
    let result = client.fetch_mosque_identity().await;

    assert!(result.is_err(), "Should fail on 404 error");
}

/// Test handling of invalid JSON response.
#[tokio::test]
async fn test_fetch_invalid_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/prayer-times"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
        .mount(&mock_server)
        .await;

    let client = BackendClient::new(mock_server.uri(), &test_config()).unwrap();
    let result = client.fetch_prayer_times(None).await;

    assert!(result.is_err(), "Should fail on invalid JSON");
    let err = format!("{:#}", result.unwrap_err());
    assert!(err.contains("Failed to parse response"));
}

/// Test that a connection failure is reported as an error.
#[tokio::test]
async fn test_fetch_connection_refused() {
    let client = BackendClient::new("http://127.0.0.1:1".to_string(), &test_config()).unwrap();
    assert!(client.fetch_prayer_settings().await.is_err());
}
