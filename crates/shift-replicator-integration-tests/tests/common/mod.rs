//! Common test utilities for shift-replicator integration tests
//!
//! This module provides:
//! - A wiremock-backed [`HttpStaffingBackend`] factory
//! - Participant/company/credential fixtures and wire-shaped response bodies
//! - Executor tuning with millisecond pacing so tests run against a real
//!   HTTP server without waiting out production delays

use serde_json::{json, Value};
use shift_replicator_client::{ApiConfig, HttpStaffingBackend};
use shift_replicator_core::{
    analyze, ApiToken, Company, CredentialId, CredentialType, EventId, ExecutorConfig,
    OperatorSession, Participant, RateLimiterConfig, ReplicationAnalysis, ReplicationRequest,
};
use std::time::Duration;
use wiremock::MockServer;

pub const EVENT: &str = "evt-1";
pub const SOURCE_SHIFT: &str = "2025-08-12-evento-diurno";
pub const TARGET_SHIFT: &str = "2025-08-13-evento-diurno";

// ============================================================================
// Sessions and Clients
// ============================================================================

#[allow(dead_code)]
pub fn session() -> OperatorSession {
    OperatorSession::new("maria", ApiToken::new("tok-123")).unwrap()
}

/// Backend pointed at the mock server's root.
#[allow(dead_code)]
pub fn backend_for(server: &MockServer) -> HttpStaffingBackend {
    let config = ApiConfig {
        base_url: server.uri(),
        timeout_seconds: 5,
    };
    HttpStaffingBackend::new(&config, session()).unwrap()
}

/// Executor tuning with millisecond pacing; the limiter discipline is
/// covered by the core tests under virtual time.
#[allow(dead_code)]
pub fn fast_executor_config() -> ExecutorConfig {
    ExecutorConfig {
        batch_size: 10,
        rate_limiter: RateLimiterConfig {
            quota_per_minute: 1000,
            safety_factor: 0.8,
            window: Duration::from_millis(200),
            min_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            throttle_pad: Duration::from_millis(5),
        },
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Participant on the source shift with a stable upstream hash.
#[allow(dead_code)]
pub fn participant(name: &str, hash: &str) -> Participant {
    Participant {
        id: format!("p-{name}"),
        event_id: EventId::new(EVENT).unwrap(),
        name: name.to_string(),
        cpf: format!("cpf-{name}"),
        rg: format!("rg-{name}"),
        company: "Acme".to_string(),
        role: "Security".to_string(),
        credential_id: None,
        credential_name: "VIP".to_string(),
        participant_hash: Some(hash.to_string()),
        shift_id: Some(SOURCE_SHIFT.to_string()),
        work_date: Some("2025-08-12".to_string()),
        work_stage: None,
        work_period: None,
    }
}

#[allow(dead_code)]
pub fn existing_company(name: &str) -> Company {
    Company {
        id: format!("c-{name}"),
        event_id: EventId::new(EVENT).unwrap(),
        name: name.to_string(),
    }
}

#[allow(dead_code)]
pub fn existing_credential(name: &str) -> CredentialType {
    CredentialType {
        id: CredentialId::new(format!("cr-{name}")),
        event_id: EventId::new(EVENT).unwrap(),
        name: name.to_string(),
        color: "#3B82F6".to_string(),
        days_works: vec!["2025-08-12".to_string()],
    }
}

/// Analysis for a full gap: participants exist on the source shift only and
/// none of their companies or credentials exist yet.
#[allow(dead_code)]
pub fn full_gap_analysis(source: Vec<Participant>) -> ReplicationAnalysis {
    analyze(ReplicationRequest {
        source_shift_id: SOURCE_SHIFT.to_string(),
        target_shift_id: TARGET_SHIFT.to_string(),
        source_participants: source,
        target_participants: Vec::new(),
        existing_companies: Vec::new(),
        existing_credentials: Vec::new(),
    })
    .unwrap()
}

// ============================================================================
// Wire-shaped Response Bodies
// ============================================================================

#[allow(dead_code)]
pub fn participant_body(name: &str) -> Value {
    json!({
        "id": format!("p-{name}"),
        "eventId": EVENT,
        "name": name,
        "cpf": format!("cpf-{name}"),
    })
}

#[allow(dead_code)]
pub fn company_body(name: &str) -> Value {
    json!({
        "id": format!("c-{name}"),
        "nome": name,
        "id_evento": EVENT,
    })
}

#[allow(dead_code)]
pub fn credential_body(name: &str) -> Value {
    json!({
        "id": format!("cr-{name}"),
        "nome": name,
        "id_events": EVENT,
        "cor": "#3B82F6",
        "days_works": ["2025-08-13"],
    })
}
