//! Domain records consumed by the replication engine.
//!
//! Participants, companies and credential types are owned by the remote
//! staffing API; the core only reads them and creates new records in the
//! target shift. Shape validation happens at the API boundary (client crate),
//! so everything here is an explicit typed record rather than a loose map.

use crate::shift::{ShiftPeriod, ShiftStage};
use crate::{CredentialId, EventId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// Participant
// ============================================================================

/// One person working a shift of an event.
///
/// Read-only to the core: replication never mutates a participant in place,
/// it only creates copies in the target shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Record id issued by the API
    pub id: String,

    /// Event the participant belongs to
    pub event_id: EventId,

    /// Full name
    pub name: String,

    /// Brazilian taxpayer id
    pub cpf: String,

    /// Identity document number
    #[serde(default)]
    pub rg: String,

    /// Employer company name (may be blank)
    #[serde(default)]
    pub company: String,

    /// Work role description
    #[serde(default)]
    pub role: String,

    /// Assigned credential type, if any
    #[serde(default)]
    pub credential_id: Option<CredentialId>,

    /// Credential type name, as displayed (may be blank)
    #[serde(default)]
    pub credential_name: String,

    /// Stable dedup key assigned upstream, when present
    #[serde(default)]
    pub participant_hash: Option<String>,

    /// Shift tagging, absent for unassigned participants
    #[serde(default)]
    pub shift_id: Option<String>,

    #[serde(default)]
    pub work_date: Option<String>,

    #[serde(default)]
    pub work_stage: Option<ShiftStage>,

    #[serde(default)]
    pub work_period: Option<ShiftPeriod>,
}

impl Participant {
    /// Stable key used to detect "the same person" across shifts.
    ///
    /// Prefers the upstream `participant_hash`; when that is absent or blank
    /// a key is synthesized from CPF and event id so two fetches of the same
    /// person always collide.
    pub fn dedup_key(&self) -> String {
        match &self.participant_hash {
            Some(hash) if !hash.trim().is_empty() => hash.clone(),
            _ => synthesize_dedup_key(&self.cpf, &self.event_id),
        }
    }
}

/// Synthesize the fallback dedup key for a participant without an upstream
/// hash: SHA-256 over `cpf:event_id`, hex encoded.
pub fn synthesize_dedup_key(cpf: &str, event_id: &EventId) -> String {
    let mut hasher = Sha256::new();
    hasher.update(cpf.as_bytes());
    hasher.update(b":");
    hasher.update(event_id.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

// ============================================================================
// Supporting Entities
// ============================================================================

/// Employer company registered within an event.
///
/// Identified by case-sensitive exact name; considered "existing" for a
/// target shift only if present in the collection the caller supplies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub event_id: EventId,
    pub name: String,
}

/// Credential type registered within an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialType {
    pub id: CredentialId,
    pub event_id: EventId,
    pub name: String,

    /// Display color, `#RRGGBB`
    #[serde(default)]
    pub color: String,

    /// ISO dates this credential is valid for
    #[serde(default)]
    pub days_works: Vec<String>,
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
