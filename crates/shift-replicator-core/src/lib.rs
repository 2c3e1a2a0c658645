//! # Shift Replicator Core
//!
//! Core engine for replicating event-staffing records between work shifts.
//!
//! Given a source shift and a target shift of the same event, the engine
//! computes which participants are present in the source but absent from the
//! target, determines which supporting entities (companies, credential types)
//! must be created first, and executes all required creations against a
//! remote staffing API while self-throttling under the external rate limit.
//!
//! ## Architecture
//!
//! The core follows the same layering as the rest of the workspace:
//! - Business logic depends only on trait abstractions ([`StaffingBackend`],
//!   [`ProgressObserver`])
//! - Transport implementations are injected at runtime
//! - Analysis is pure and side-effect free; all remote effects live in the
//!   executor
//!
//! ## Usage
//!
//! ```rust
//! use shift_replicator_core::ShiftKey;
//!
//! let key = ShiftKey::parse("2025-08-12-evento-diurno");
//! assert_eq!(key.date_iso(), "2025-08-12");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod analyzer;
pub mod backend;
pub mod executor;
pub mod model;
pub mod progress;
pub mod rate_limiter;
pub mod session;
pub mod shift;

pub use analyzer::{analyze, AnalysisError, GapAnalysis, ReplicationAnalysis, ReplicationRequest};
pub use backend::{
    BackendError, NewCompany, NewCredential, NewParticipant, StaffingBackend, DEFAULT_CREDENTIAL_COLOR,
};
pub use executor::{
    CancelHandle, ExecutionReport, ExecutorConfig, ItemFailure, ReplicationExecutor,
    ReplicationOutcome,
};
pub use model::{Company, CredentialType, Participant};
pub use progress::{
    format_duration, NullObserver, ProgressObserver, ReplicationPhase, ReplicationProgress,
};
pub use rate_limiter::{AdaptiveRateLimiter, RateLimiterConfig, RateLimiterSnapshot};
pub use session::{ApiToken, OperatorSession, SYSTEM_VALIDATOR};
pub use shift::{format_date_iso, ShiftKey, ShiftPeriod, ShiftStage};

// ============================================================================
// Domain Identifier Types
// ============================================================================

/// Identifier of a staffing event, as issued by the remote API.
///
/// Opaque to the core; only non-emptiness is enforced because the dedup
/// fallback key concatenates it with the participant CPF.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Create a new event id with validation
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "event_id".to_string(),
            });
        }
        Ok(Self(value))
    }

    /// Get string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Identifier of a credential type within an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialId(String);

impl CredentialId {
    /// Create a new credential id
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one replication run.
///
/// Attached to every tracing span and to the final report so partial
/// failures can be correlated across log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplicationRunId(uuid::Uuid);

impl ReplicationRunId {
    /// Generate a new unique run id
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ReplicationRunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReplicationRunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Validation Errors
// ============================================================================

/// Field-level validation failures for domain values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} exceeds maximum length of {max_length}")]
    TooLong { field: String, max_length: usize },

    #[error("{field} has invalid format: {message}")]
    InvalidFormat { field: String, message: String },
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
