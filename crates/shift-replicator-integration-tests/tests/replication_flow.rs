//! End-to-end replication runs against a mock staffing API.
//!
//! These tests drive the real executor through the real HTTP backend and
//! assert on the requests the server received, including their order.

mod common;

use common::*;
use serde_json::json;
use shift_replicator_core::{
    analyze, CancelHandle, NullObserver, ReplicationExecutor, ReplicationOutcome,
    ReplicationRequest,
};
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_happy_creates(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(201).set_body_json(company_body("Acme")))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/credentials"))
        .respond_with(ResponseTemplate::new(201).set_body_json(credential_body("VIP")))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/participants"))
        .respond_with(ResponseTemplate::new(201).set_body_json(participant_body("any")))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/events/{EVENT}/refresh")))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

#[tokio::test]
async fn full_gap_run_creates_entities_before_participants() {
    let server = MockServer::start().await;
    mount_happy_creates(&server).await;

    let analysis = full_gap_analysis(vec![participant("ana", "h-1"), participant("bia", "h-2")]);
    assert_eq!(analysis.total_operations(), 4);

    let executor = ReplicationExecutor::with_config(
        Arc::new(backend_for(&server)),
        session(),
        fast_executor_config(),
    );
    let report = executor
        .execute(analysis, &NullObserver, &CancelHandle::new())
        .await;

    assert_eq!(report.outcome, ReplicationOutcome::FullSuccess);
    assert_eq!(report.success_count, 4);
    assert_eq!(report.error_count, 0);
    assert!(report.failures.is_empty());

    let paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(
        paths,
        vec![
            "/companies",
            "/credentials",
            "/participants",
            "/participants",
            format!("/events/{EVENT}/refresh").as_str(),
        ]
    );
}

#[tokio::test]
async fn failed_participant_does_not_abort_the_run() {
    let server = MockServer::start().await;

    // Specific failure first: wiremock picks the first matching mock.
    Mock::given(method("POST"))
        .and(path("/participants"))
        .and(body_partial_json(json!({ "name": "bia" })))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage offline"))
        .mount(&server)
        .await;
    mount_happy_creates(&server).await;

    let analysis = analyze(ReplicationRequest {
        source_shift_id: SOURCE_SHIFT.to_string(),
        target_shift_id: TARGET_SHIFT.to_string(),
        source_participants: vec![participant("ana", "h-1"), participant("bia", "h-2")],
        target_participants: Vec::new(),
        existing_companies: vec![existing_company("Acme")],
        existing_credentials: vec![existing_credential("VIP")],
    })
    .unwrap();
    assert_eq!(analysis.total_operations(), 2);

    let executor = ReplicationExecutor::with_config(
        Arc::new(backend_for(&server)),
        session(),
        fast_executor_config(),
    );
    let report = executor
        .execute(analysis, &NullObserver, &CancelHandle::new())
        .await;

    assert_eq!(report.outcome, ReplicationOutcome::PartialSuccess);
    assert_eq!(report.success_count, 1);
    assert_eq!(report.error_count, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].item, "bia");
    assert!(report.failures[0].transient);
    assert!(report.failures[0].error.contains("storage offline"));
}

#[tokio::test]
async fn already_replicated_shift_makes_no_http_calls() {
    let server = MockServer::start().await;

    // Same people on both shifts, entities present: nothing to do.
    let analysis = analyze(ReplicationRequest {
        source_shift_id: SOURCE_SHIFT.to_string(),
        target_shift_id: TARGET_SHIFT.to_string(),
        source_participants: vec![participant("ana", "h-1")],
        target_participants: vec![participant("ana", "h-1")],
        existing_companies: vec![existing_company("Acme")],
        existing_credentials: vec![existing_credential("VIP")],
    })
    .unwrap();
    assert!(analysis.is_empty());

    let executor = ReplicationExecutor::with_config(
        Arc::new(backend_for(&server)),
        session(),
        fast_executor_config(),
    );
    let report = executor
        .execute(analysis, &NullObserver, &CancelHandle::new())
        .await;

    assert_eq!(report.outcome, ReplicationOutcome::NoOp);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn fetch_analyze_execute_round_trip() {
    let server = MockServer::start().await;

    let source = vec![participant("ana", "h-1"), participant("bia", "h-2")];
    Mock::given(method("GET"))
        .and(path(format!(
            "/events/{EVENT}/shifts/{SOURCE_SHIFT}/participants"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(&source))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!(
            "/events/{EVENT}/shifts/{TARGET_SHIFT}/participants"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/events/{EVENT}/companies")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([company_body("Acme")])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/events/{EVENT}/credentials")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([credential_body("VIP")])))
        .mount(&server)
        .await;
    mount_happy_creates(&server).await;

    let backend = backend_for(&server);
    let event_id = EVENT.parse().unwrap();
    let source_key = shift_replicator_core::ShiftKey::parse(SOURCE_SHIFT);
    let target_key = shift_replicator_core::ShiftKey::parse(TARGET_SHIFT);

    let analysis = analyze(ReplicationRequest {
        source_shift_id: SOURCE_SHIFT.to_string(),
        target_shift_id: TARGET_SHIFT.to_string(),
        source_participants: backend
            .fetch_participants_by_shift(&event_id, &source_key)
            .await
            .unwrap(),
        target_participants: backend
            .fetch_participants_by_shift(&event_id, &target_key)
            .await
            .unwrap(),
        existing_companies: backend.fetch_companies(&event_id).await.unwrap(),
        existing_credentials: backend.fetch_credentials(&event_id).await.unwrap(),
    })
    .unwrap();

    // Companies and credentials already exist, only the two copies remain.
    assert_eq!(analysis.total_operations(), 2);
    assert!(analysis.companies.to_create.is_empty());
    assert!(analysis.credentials.to_create.is_empty());

    let executor = ReplicationExecutor::with_config(
        Arc::new(backend),
        session(),
        fast_executor_config(),
    );
    let report = executor
        .execute(analysis, &NullObserver, &CancelHandle::new())
        .await;

    assert_eq!(report.outcome, ReplicationOutcome::FullSuccess);
    assert_eq!(report.success_count, 2);
}
