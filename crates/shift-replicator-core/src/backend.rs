//! Abstract boundary to the remote staffing API.
//!
//! The engine only ever issues the four calls below; the actual transport
//! (REST, in-memory test double) is injected at runtime. Per-item failures
//! are values, not panics: the executor counts them and moves on.

use crate::model::{Company, CredentialType, Participant};
use crate::shift::ShiftKey;
use crate::{CredentialId, EventId};
use async_trait::async_trait;
use thiserror::Error;

/// Display color seeded on credentials created by replication.
pub const DEFAULT_CREDENTIAL_COLOR: &str = "#3B82F6";

// ============================================================================
// Creation Requests
// ============================================================================

/// Request to register a company in the target shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    pub name: String,
    pub event_id: EventId,

    /// Target shift the company is tagged with
    pub shift: ShiftKey,
}

/// Request to register a credential type in the target shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCredential {
    pub name: String,
    pub event_id: EventId,

    /// Display color, `#RRGGBB`
    pub color: String,

    /// ISO dates the credential is valid for, seeded with the target date
    pub days_works: Vec<String>,

    pub shift: ShiftKey,
}

/// Request to copy a participant into the target shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParticipant {
    pub event_id: EventId,
    pub name: String,
    pub cpf: String,
    pub rg: String,
    pub company: String,
    pub role: String,

    /// ISO dates the participant works, seeded with the target date
    pub days_work: Vec<String>,

    pub credential_id: Option<CredentialId>,

    /// Audit attribution: system marker plus driving operator
    pub validated_by: String,

    pub shift: ShiftKey,
}

// ============================================================================
// Errors
// ============================================================================

/// Failure of a single remote call.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The API answered with a non-success status
    #[error("API rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The call never produced an HTTP response
    #[error("transport failure: {message}")]
    Transport { message: String },

    /// The response arrived but could not be decoded
    #[error("unexpected response shape: {message}")]
    InvalidResponse { message: String },
}

impl BackendError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Informational only: the executor never retries, but the final report
    /// distinguishes transient from permanent failures.
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Rejected { status, .. } => *status >= 500,
            BackendError::Transport { .. } => true,
            BackendError::InvalidResponse { .. } => false,
        }
    }
}

// ============================================================================
// Backend Trait
// ============================================================================

/// Remote staffing API, as seen by the executor.
///
/// Implementations must be safe to share across await points; the executor
/// itself issues calls strictly sequentially.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StaffingBackend: Send + Sync {
    /// Register a company for the event, tagged with the target shift
    async fn create_company(&self, company: NewCompany) -> Result<Company, BackendError>;

    /// Register a credential type for the event
    async fn create_credential(
        &self,
        credential: NewCredential,
    ) -> Result<CredentialType, BackendError>;

    /// Create a participant copy in the target shift
    async fn create_participant(
        &self,
        participant: NewParticipant,
    ) -> Result<Participant, BackendError>;

    /// Refresh downstream cached views (participants by event, grouped
    /// participants, companies, credentials) after a run touched the event
    async fn invalidate_caches(&self, event_id: &EventId) -> Result<(), BackendError>;
}
