//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::json;
use spendsight_core::test_utils::{backend_row, MockBackendServer, MockSuggestionServer};
use spendsight_core::insights::AlertKind;
use spendsight_core::{Alert, AppConfig, Severity, SuggestionClient};

use crate::commands::{self, truncate};

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 20)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn rows(count: i64) -> Vec<serde_json::Value> {
    (0..count)
        .map(|i| {
            let date = (now() - Duration::days(i)).date().format("%Y-%m-%d").to_string();
            let category = if i % 2 == 0 { Some("Food") } else { None };
            backend_row(&format!("t{}", i), &date, 25.0 + i as f64, category)
        })
        .collect()
}

fn alert_with(severity: Severity) -> Alert {
    Alert::new(AlertKind::CategorySpike, severity, "Food", "Spending jumped")
}

fn snapshot_file(count: i64) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let content = json!({"transactions": rows(count), "categories": []});
    file.write_all(content.to_string().as_bytes()).unwrap();
    file
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly10!", 10), "exactly10!");
    assert_eq!(truncate("this is a long string", 10), "this is...");
    // counts characters, not bytes
    assert_eq!(truncate("סופר פארם רמת אביב", 8), "סופר ...");
}

#[test]
fn test_resolve_now_formats() {
    let config = AppConfig::default();

    let date_only = commands::resolve_now(Some("2024-03-20"), &config).unwrap();
    assert_eq!(
        date_only,
        NaiveDate::from_ymd_opt(2024, 3, 21)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    );

    let with_time = commands::resolve_now(Some("2024-03-20T12:00"), &config).unwrap();
    assert_eq!(with_time, now());

    assert!(commands::resolve_now(Some("20/03/2024"), &config).is_err());
    assert!(commands::resolve_now(None, &config).is_ok());
}

#[test]
fn test_open_source_requires_backend_or_file() {
    let config = AppConfig::default();
    assert!(commands::open_source(&config, None).is_err());

    let file = snapshot_file(3);
    let source = commands::open_source(&config, Some(file.path())).unwrap();
    assert!(source.describe().starts_with("file "));
}

#[test]
fn test_config_masks_api_key() {
    let mut config = AppConfig::default();
    config.backend.api_key = Some("super-secret".to_string());

    let shown = commands::masked(&config);
    assert_eq!(shown.backend.api_key.as_deref(), Some("********"));
    assert!(commands::cmd_config_show(&config, None).is_ok());
}

// ========== Report Command Tests ==========

#[tokio::test]
async fn test_cmd_insights_from_file() {
    let config = AppConfig::default();
    let file = snapshot_file(60);

    assert!(commands::cmd_insights(&config, Some(file.path()), now(), false)
        .await
        .is_ok());
    assert!(commands::cmd_insights(&config, Some(file.path()), now(), true)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_cmd_reports_on_empty_snapshot() {
    let config = AppConfig::default();
    let file = snapshot_file(0);

    assert!(commands::cmd_dashboard(&config, Some(file.path()), now(), false)
        .await
        .is_ok());
    assert!(commands::cmd_alerts(&config, Some(file.path()), now(), None, false)
        .await
        .is_ok());
    assert!(commands::cmd_forecast(&config, Some(file.path()), now(), true)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_cmd_dashboard_from_backend() {
    let server = MockBackendServer::start(rows(40), vec![]).await;
    let mut config = AppConfig::default();
    config.backend.url = Some(server.url());

    assert!(commands::cmd_dashboard(&config, None, now(), false)
        .await
        .is_ok());
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn test_build_snapshot_counts_records() {
    let config = AppConfig::default();
    let file = snapshot_file(12);

    let snapshot = commands::build_snapshot(&config, Some(file.path()), now())
        .await
        .unwrap();
    assert_eq!(snapshot.record_count, 12);
    assert_eq!(snapshot.dashboard.recent.len(), 10);
}

#[tokio::test]
async fn test_missing_snapshot_file_fails_command() {
    let config = AppConfig::default();
    let missing = std::path::Path::new("/nonexistent/snapshot.json");

    assert!(commands::cmd_insights(&config, Some(missing), now(), false)
        .await
        .is_err());
}

#[test]
fn test_alerts_filtered_by_severity() {
    let alerts = vec![
        Alert::new(AlertKind::AllClear, Severity::Success, "All clear", "Nothing"),
        alert_with(Severity::Critical),
        alert_with(Severity::Info),
        alert_with(Severity::Warning),
    ];

    let kept = commands::alerts_at_least(alerts.clone(), Some(Severity::Warning));
    let severities: Vec<Severity> = kept.iter().map(|a| a.severity).collect();
    assert_eq!(severities, vec![Severity::Critical, Severity::Warning]);

    assert_eq!(commands::alerts_at_least(alerts, None).len(), 4);
    assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
}

#[tokio::test]
async fn test_cmd_alerts_with_min_severity() {
    let config = AppConfig::default();
    let file = snapshot_file(60);

    assert!(commands::cmd_alerts(
        &config,
        Some(file.path()),
        now(),
        Some(Severity::Critical),
        true
    )
    .await
    .is_ok());
}

// ========== Suggestion Command Tests ==========

#[tokio::test]
async fn test_suggestion_commands() {
    let server = MockSuggestionServer::start().await;
    let client = SuggestionClient::new(&server.url());
    let config = AppConfig::default();

    assert!(commands::cmd_suggestions_list(&client, false).await.is_ok());
    assert!(commands::cmd_suggestions_new(&client, &config, false)
        .await
        .is_ok());
    assert!(commands::cmd_suggestions_accept(&client, "WOLT TLV", "Food")
        .await
        .is_ok());
    assert!(commands::cmd_suggestions_reject(&client, "PANGO")
        .await
        .is_ok());
    assert!(commands::cmd_suggestions_approve(&client, "NEW CAFE", "Food")
        .await
        .is_ok());
    assert_eq!(server.requests().len(), 3);
}

#[test]
fn test_suggestion_client_requires_url() {
    let config = AppConfig::default();
    assert!(commands::suggestion_client(&config).is_err());

    let mut config = AppConfig::default();
    config.suggestions.url = Some("http://localhost:5000".to_string());
    assert!(commands::suggestion_client(&config).is_ok());
}
