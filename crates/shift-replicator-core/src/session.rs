//! Operator session context.
//!
//! The session is an explicit value injected into whatever component issues
//! audited actions: the HTTP backend uses the token for authentication and
//! the executor stamps created records with the operator attribution.

use crate::ValidationError;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Marker written into `validated_by` on records created by a replication
/// run, so replicated rows are distinguishable from manual check-ins.
pub const SYSTEM_VALIDATOR: &str = "sistema-replicacao";

/// API token, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wrap a raw token string
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the token for immediate use in an `Authorization` header.
    ///
    /// The returned slice is the actual secret; do not store or log it.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Check whether the token is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiToken")
            .field("length", &self.0.len())
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Identity of the operator driving a replication run.
#[derive(Debug, Clone)]
pub struct OperatorSession {
    operator: String,
    token: ApiToken,
}

impl OperatorSession {
    /// Create a session with validation
    pub fn new(operator: impl Into<String>, token: ApiToken) -> Result<Self, ValidationError> {
        let operator = operator.into();
        if operator.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "operator".to_string(),
            });
        }
        if token.is_empty() {
            return Err(ValidationError::Required {
                field: "api_token".to_string(),
            });
        }
        Ok(Self { operator, token })
    }

    /// Operator display name
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// API token for the transport layer
    pub fn token(&self) -> &ApiToken {
        &self.token
    }

    /// Attribution string written into created records:
    /// the system marker plus the driving operator.
    pub fn validated_by(&self) -> String {
        format!("{} ({})", SYSTEM_VALIDATOR, self.operator)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
