//! End-to-end tests for label assignment against a mock PCE.

use std::io::Write;

use pce_labels::{assign, PceClient, PceConfig, SyncError};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::NamedTempFile;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Helpers
// =============================================================================

fn workload_csv(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "ip,role,app,env,loc").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}

fn client_for(server: &MockServer) -> PceClient {
    let config = PceConfig::new(&server.uri(), "orgs/85", "api_user", "api_secret").unwrap();
    PceClient::new(&config).unwrap()
}

async fn mount_labels(server: &MockServer, labels: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v2/orgs/85/labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(labels))
        .mount(server)
        .await;
}

async fn mount_workloads(server: &MockServer, workloads: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v2/orgs/85/workloads"))
        .and(query_param("managed", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(workloads))
        .mount(server)
        .await;
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_assigns_existing_labels_by_public_ip() {
    let server = MockServer::start().await;
    mount_labels(
        &server,
        json!([
            {"key": "role", "value": "web", "href": "/orgs/85/labels/1"},
            {"key": "app", "value": "billing", "href": "/orgs/85/labels/2"},
            {"key": "env", "value": "prod", "href": "/orgs/85/labels/3"},
            {"key": "loc", "value": "us-east", "href": "/orgs/85/labels/4"}
        ]),
    )
    .await;
    mount_workloads(
        &server,
        json!([
            {"href": "/orgs/85/workloads/w1", "public_ip": "192.168.1.113",
             "interfaces": [{"name": "eth0", "address": "10.1.1.5"}]},
            {"href": "/orgs/85/workloads/w2", "public_ip": "192.168.1.200", "interfaces": []}
        ]),
    )
    .await;
    Mock::given(method("PUT"))
        .and(path("/api/v2/orgs/85/workloads/w1"))
        .and(body_json(json!({"labels": [
            {"href": "/orgs/85/labels/1"},
            {"href": "/orgs/85/labels/2"},
            {"href": "/orgs/85/labels/3"},
            {"href": "/orgs/85/labels/4"}
        ]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let csv = workload_csv(&[
        "192.168.1.113,web,billing,prod,us-east",
        "19.16.1.111,web,billing,prod,us-east",
    ]);
    let summary = assign::run(&client_for(&server), csv.path()).await.unwrap();

    assert_eq!(summary.labels_assigned, vec!["192.168.1.113".to_string()]);
    assert_eq!(summary.not_assigned, vec!["19.16.1.111".to_string()]);
    assert!(summary.failed.is_empty());
}

#[tokio::test]
async fn test_creates_missing_labels_once() {
    let server = MockServer::start().await;
    mount_labels(&server, json!([])).await;
    mount_workloads(
        &server,
        json!([
            {"href": "/orgs/85/workloads/w1", "interfaces": [{"address": "10.0.0.1"}]},
            {"href": "/orgs/85/workloads/w2", "interfaces": [{"address": "10.0.0.2"}]}
        ]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/orgs/85/labels"))
        .and(body_json(json!({"key": "role", "value": "db"})))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"href": "/orgs/85/labels/10", "key": "role", "value": "db"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(body_json(json!({"labels": [{"href": "/orgs/85/labels/10"}]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;

    let csv = workload_csv(&["10.0.0.1,db,,,", "10.0.0.2,db,,,"]);
    let summary = assign::run(&client_for(&server), csv.path()).await.unwrap();

    assert!(summary.changed);
    assert_eq!(
        summary.labels_assigned,
        vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()]
    );
}

#[tokio::test]
async fn test_failed_update_is_recorded_and_run_continues() {
    let server = MockServer::start().await;
    mount_labels(
        &server,
        json!([{"key": "env", "value": "prod", "href": "/orgs/85/labels/3"}]),
    )
    .await;
    mount_workloads(
        &server,
        json!([
            {"href": "/orgs/85/workloads/w1", "public_ip": "10.0.0.1"},
            {"href": "/orgs/85/workloads/w2", "public_ip": "10.0.0.2"}
        ]),
    )
    .await;
    Mock::given(method("PUT"))
        .and(path("/api/v2/orgs/85/workloads/w1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v2/orgs/85/workloads/w2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let csv = workload_csv(&["10.0.0.1,,,prod,", "10.0.0.2,,,prod,"]);
    let summary = assign::run(&client_for(&server), csv.path()).await.unwrap();

    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].ip, "10.0.0.1");
    assert_eq!(summary.failed[0].error, "API error: 500 - internal");
    assert_eq!(summary.labels_assigned, vec!["10.0.0.2".to_string()]);
}

#[tokio::test]
async fn test_auth_failure_aborts_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let csv = workload_csv(&["10.0.0.1,web,,,"]);
    let err = assign::run(&client_for(&server), csv.path())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Auth { status: 401 }));
}

#[tokio::test]
async fn test_unreadable_csv_aborts_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = assign::run(&client_for(&server), "/nonexistent/workload.csv")
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Io(_)));
}

#[tokio::test]
async fn test_partial_update_is_reported_as_assigned_and_failed() {
    let server = MockServer::start().await;
    mount_labels(
        &server,
        json!([{"key": "env", "value": "prod", "href": "/orgs/85/labels/3"}]),
    )
    .await;
    mount_workloads(
        &server,
        json!([
            {"href": "/orgs/85/workloads/w1", "public_ip": "10.0.0.1"},
            {"href": "/orgs/85/workloads/w2", "interfaces": [{"address": "10.0.0.1"}]}
        ]),
    )
    .await;
    Mock::given(method("PUT"))
        .and(path("/api/v2/orgs/85/workloads/w1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v2/orgs/85/workloads/w2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .expect(1)
        .mount(&server)
        .await;

    let csv = workload_csv(&["10.0.0.1,,,prod,"]);
    let summary = assign::run(&client_for(&server), csv.path()).await.unwrap();

    assert!(summary.changed);
    assert_eq!(summary.labels_assigned, vec!["10.0.0.1".to_string()]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].ip, "10.0.0.1");
    assert_eq!(summary.failed[0].error, "API error: 500 - internal");
}

#[tokio::test]
async fn test_created_label_marks_change_when_workload_fetch_fails() {
    let server = MockServer::start().await;
    mount_labels(&server, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/v2/orgs/85/labels"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"href": "/orgs/85/labels/10", "key": "role", "value": "db"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/orgs/85/workloads"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let csv = workload_csv(&["10.0.0.1,db,,,"]);
    let summary = assign::run(&client_for(&server), csv.path()).await.unwrap();

    assert!(summary.changed);
    assert!(summary.labels_assigned.is_empty());
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].ip, "10.0.0.1");
}
