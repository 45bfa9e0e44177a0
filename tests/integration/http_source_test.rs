#![allow(clippy::expect_used)]

use std::time::Duration;

use chrono::{TimeZone, Utc};
use mockito::{Matcher, Server};
use serde_json::json;

use siemdeck::application::services::{
    AlertConsole, AlertListStore, AlertQueryState, FetchOutcome, MetricsService, Resolution,
    SelectionResolver,
};
use siemdeck::domain::ports::data_source::{AlertDataSource, DataSourceError};
use siemdeck::domain::value_objects::fetch_status::FetchStatus;
use siemdeck::domain::value_objects::query::{AlertQuery, FilterUpdate, Pagination};
use siemdeck::domain::value_objects::severity::Severity;
use siemdeck::domain::value_objects::severity_distribution::{SeverityDistribution, TimeWindow};
use siemdeck::infrastructure::http::alert_api::HttpAlertSource;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn load_fixture(name: &str) -> String {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path).expect("Failed to read fixture")
}

fn source_for(url: &str) -> HttpAlertSource {
    HttpAlertSource::new(url, Duration::from_secs(5), vec![]).expect("source")
}

fn query_with(limit: u32, offset: u32, updates: Vec<FilterUpdate>) -> AlertQuery {
    let mut query = AlertQuery {
        pagination: Pagination::new(limit, offset).expect("pagination"),
        ..AlertQuery::default()
    };
    for update in updates {
        query.filters.apply(update);
    }
    query
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_sends_filters_as_query_parameters() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/alerts")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "25".into()),
            Matcher::UrlEncoded("offset".into(), "50".into()),
            Matcher::UrlEncoded("severity_min".into(), "10".into()),
            Matcher::UrlEncoded("agent_id".into(), "004".into()),
            Matcher::UrlEncoded("start_time".into(), "2024-03-01T00:00:00+00:00".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(load_fixture("alerts_page.json"))
        .create_async()
        .await;

    let source = source_for(&server.url());
    let query = query_with(
        25,
        50,
        vec![
            FilterUpdate::SeverityMin(Some(10)),
            FilterUpdate::AgentId(Some("004".into())),
            FilterUpdate::StartTime(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).single()),
        ],
    );

    let page = source.list_alerts(&query).await.expect("page");
    mock.assert_async().await;

    assert_eq!(page.total, 2);
    assert_eq!(page.alerts.len(), 2);
    let first = &page.alerts[0];
    assert_eq!(first.id, "1709294400.1001");
    assert_eq!(first.agent.ip.as_deref(), Some("10.0.0.4"));
    assert_eq!(first.mitre_ids(), ["T1110".to_string()]);
    assert_eq!(first.rule.firedtimes, Some(12));
    assert_eq!(first.severity(), Severity::Medium);
    assert_eq!(page.alerts[1].severity(), Severity::Critical);
    assert!(page.alerts[1].full_log.is_none());
}

#[tokio::test]
async fn search_term_switches_to_search_endpoint() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/alerts/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "100".into()),
            Matcher::UrlEncoded("offset".into(), "0".into()),
        ]))
        .match_body(Matcher::PartialJson(json!({
            "query": "invalid user",
            "fields": ["rule.description", "full_log", "agent.name"],
            "filters": { "severity_min": 5 }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "alerts": [], "total": 0, "limit": 100, "offset": 0 }).to_string())
        .create_async()
        .await;

    let source = source_for(&server.url());
    let query = query_with(
        100,
        0,
        vec![
            FilterUpdate::SeverityMin(Some(5)),
            FilterUpdate::Search("  invalid user ".into()),
        ],
    );

    let page = source.list_alerts(&query).await.expect("page");
    mock.assert_async().await;
    assert_eq!(page.total, 0);
    assert!(page.alerts.is_empty());
}

#[tokio::test]
async fn configured_search_fields_are_sent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/alerts/search")
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({ "fields": ["data.srcip"] })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "alerts": [], "total": 0 }).to_string())
        .create_async()
        .await;

    let source = HttpAlertSource::new(
        &server.url(),
        Duration::from_secs(5),
        vec!["data.srcip".to_string()],
    )
    .expect("source");
    let query = query_with(10, 0, vec![FilterUpdate::Search("203.0.113.9".into())]);

    source.list_alerts(&query).await.expect("page");
    mock.assert_async().await;
}

#[tokio::test]
async fn server_error_carries_backend_detail() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v1/alerts")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(json!({ "detail": "backend unavailable" }).to_string())
        .create_async()
        .await;

    let source = source_for(&server.url());
    let err = source
        .list_alerts(&AlertQuery::default())
        .await
        .expect_err("server error");

    assert_eq!(
        err,
        DataSourceError::Server {
            status: Some(500),
            detail: Some("backend unavailable".into()),
        }
    );
    assert!(err.to_string().contains("backend unavailable"));
}

#[tokio::test]
async fn server_error_without_json_uses_reason() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v1/alerts")
        .match_query(Matcher::Any)
        .with_status(502)
        .with_body("<html>upstream down</html>")
        .create_async()
        .await;

    let source = source_for(&server.url());
    let err = source
        .list_alerts(&AlertQuery::default())
        .await
        .expect_err("server error");

    assert_eq!(
        err,
        DataSourceError::Server {
            status: Some(502),
            detail: Some("Bad Gateway".into()),
        }
    );
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v1/alerts")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"alerts": "nope"}"#)
        .create_async()
        .await;

    let source = source_for(&server.url());
    let err = source
        .list_alerts(&AlertQuery::default())
        .await
        .expect_err("invalid body");
    assert!(matches!(err, DataSourceError::InvalidResponse(_)));
}

#[tokio::test]
async fn unanswered_request_times_out() {
    // Accepted by the kernel backlog but never answered.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let url = format!("http://{}", listener.local_addr().expect("addr"));

    let source =
        HttpAlertSource::new(&url, Duration::from_millis(200), vec![]).expect("source");
    let err = source
        .list_alerts(&AlertQuery::default())
        .await
        .expect_err("timeout");

    assert_eq!(err, DataSourceError::Timeout);
    drop(listener);
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let url = format!("http://{}", listener.local_addr().expect("addr"));
    drop(listener);

    let source = source_for(&url);
    let err = source
        .get_alert_by_id("any")
        .await
        .expect_err("refused");
    assert!(matches!(err, DataSourceError::Transport(_)));
}

// ---------------------------------------------------------------------------
// Single alert
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_alert_by_id_decodes_record() {
    let mut server = Server::new_async().await;
    let fixture: serde_json::Value =
        serde_json::from_str(&load_fixture("alerts_page.json")).expect("fixture json");
    let mock = server
        .mock("GET", "/api/v1/alerts/1709294100.997")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(fixture["alerts"][1].to_string())
        .create_async()
        .await;

    let source = source_for(&server.url());
    let alert = source
        .get_alert_by_id("1709294100.997")
        .await
        .expect("alert");

    mock.assert_async().await;
    assert_eq!(alert.agent.name, "db-02");
    assert_eq!(alert.rule.level, 13);
    assert!(alert.mitre_ids().is_empty());
}

#[tokio::test]
async fn missing_alert_is_not_found() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v1/alerts/ghost")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(json!({ "detail": "Alert not found" }).to_string())
        .create_async()
        .await;

    let source = source_for(&server.url());
    let err = source.get_alert_by_id("ghost").await.expect_err("missing");
    assert_eq!(err, DataSourceError::NotFound("ghost".into()));
}

// ---------------------------------------------------------------------------
// Console over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn console_over_http_end_to_end() {
    let mut server = Server::new_async().await;
    let list_mock = server
        .mock("GET", "/api/v1/alerts")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(load_fixture("alerts_page.json"))
        .expect(1)
        .create_async()
        .await;
    let lookup_mock = server
        .mock("GET", "/api/v1/alerts/ghost")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let source = source_for(&server.url());
    let query = AlertQueryState::new(50).expect("query");
    let list = AlertListStore::new(&source, &query);
    let selection = SelectionResolver::new(&source, &list);
    let console = AlertConsole::new(&query, &list, &selection);

    assert_eq!(console.fetch_alerts().await, FetchOutcome::Loaded);
    let state = console.state();
    assert_eq!(state.status, FetchStatus::Loaded);
    assert_eq!(state.total, 2);

    // On the loaded page: resolved locally.
    let local = console.select_alert(Some("1709294400.1001")).await;
    assert!(matches!(local, Resolution::Found(ref a) if a.agent.name == "web-01"));

    // Deep link to a missing alert: one lookup, prior selection kept.
    let missing = console.select_alert(Some("ghost")).await;
    assert_eq!(
        missing,
        Resolution::Failed(DataSourceError::NotFound("ghost".into()))
    );
    let state = console.state();
    assert_eq!(
        state.selected_alert.map(|a| a.id).as_deref(),
        Some("1709294400.1001")
    );
    assert_eq!(state.status, FetchStatus::Errored);

    list_mock.assert_async().await;
    lookup_mock.assert_async().await;
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn severity_distribution_unwraps_metric_envelope() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/metrics/severity")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("start_time".into(), "2024-03-01T00:00:00+00:00".into()),
            Matcher::UrlEncoded("end_time".into(), "2024-03-02T00:00:00+00:00".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(load_fixture("severity_metric.json"))
        .create_async()
        .await;

    let source = source_for(&server.url());
    let window = TimeWindow {
        start: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).single(),
        end: Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).single(),
    };
    let dist = source.severity_distribution(&window).await.expect("distribution");
    mock.assert_async().await;

    assert_eq!(
        dist,
        SeverityDistribution {
            low: 120,
            medium: 45,
            high: 9,
            critical: 2,
        }
    );
    assert_eq!(dist.total(), 176);
}

#[tokio::test]
async fn open_window_sends_no_time_parameters() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/metrics/severity")
        .match_query(Matcher::Exact(String::new()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(load_fixture("severity_metric.json"))
        .create_async()
        .await;

    let source = source_for(&server.url());
    let metrics = MetricsService::new(&source);
    let dist = metrics
        .severity_distribution(TimeWindow::default())
        .await
        .expect("distribution");
    mock.assert_async().await;
    assert_eq!(dist.critical, 2);
}

#[tokio::test]
async fn severity_distribution_failure_carries_detail() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v1/metrics/severity")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(json!({ "detail": "cache not ready" }).to_string())
        .create_async()
        .await;

    let source = source_for(&server.url());
    let err = source
        .severity_distribution(&TimeWindow::default())
        .await
        .expect_err("server error");
    assert_eq!(
        err,
        DataSourceError::Server {
            status: Some(500),
            detail: Some("cache not ready".into()),
        }
    );
}

#[tokio::test]
async fn severity_distribution_without_data_is_invalid_response() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v1/metrics/severity")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "metric_name": "severity_distribution" }).to_string())
        .create_async()
        .await;

    let source = source_for(&server.url());
    let err = source
        .severity_distribution(&TimeWindow::default())
        .await
        .expect_err("missing data");
    assert!(matches!(err, DataSourceError::InvalidResponse(_)));
}
