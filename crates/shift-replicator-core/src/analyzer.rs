//! Replication analysis.
//!
//! Pure diffing, no side effects: given the participants of a source and a
//! target shift plus the entities already registered for the event, produce
//! the plan the executor will walk. The plan is immutable once produced and
//! consumed exactly once.

use crate::model::{Company, CredentialType, Participant};
use crate::rate_limiter::RateLimiterConfig;
use crate::shift::ShiftKey;
use crate::EventId;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Request and Errors
// ============================================================================

/// Inputs for one analysis.
///
/// Participant lists and entity collections are caller-supplied snapshots;
/// the analyzer never re-fetches, so staleness is the caller's problem.
#[derive(Debug, Clone)]
pub struct ReplicationRequest {
    pub source_shift_id: String,
    pub target_shift_id: String,
    pub source_participants: Vec<Participant>,
    pub target_participants: Vec<Participant>,
    pub existing_companies: Vec<Company>,
    pub existing_credentials: Vec<CredentialType>,
}

/// Validation failures surfaced before any side effect.
///
/// Messages are user-facing; the caller shows them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("select both a source and a target shift before replicating")]
    MissingShift,

    #[error("source and target shifts must be different")]
    SameShift,

    #[error("shift {shift} has no participants to replicate")]
    EmptySourceShift { shift: String },
}

// ============================================================================
// Analysis Results
// ============================================================================

/// Required entity names partitioned by whether they already exist.
///
/// First-occurrence order is preserved, nothing is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GapAnalysis {
    /// Names already registered for the event
    pub existing: Vec<String>,

    /// Names the executor must create before participants are copied
    pub to_create: Vec<String>,
}

impl GapAnalysis {
    fn partition<'a>(
        required: impl Iterator<Item = &'a str>,
        known: &HashSet<&str>,
    ) -> Self {
        let mut seen = HashSet::new();
        let mut analysis = GapAnalysis::default();

        for name in required {
            let name = name.trim();
            if name.is_empty() || !seen.insert(name.to_string()) {
                continue;
            }
            if known.contains(name) {
                analysis.existing.push(name.to_string());
            } else {
                analysis.to_create.push(name.to_string());
            }
        }

        analysis
    }
}

/// The immutable plan for one replication run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationAnalysis {
    /// Event both shifts belong to, taken from the source participants
    pub event_id: EventId,

    pub source_shift: ShiftKey,
    pub target_shift: ShiftKey,

    /// Participant counts of the two shifts, for display
    pub source_count: usize,
    pub target_count: usize,

    /// Source participants whose dedup key is absent from the target
    pub participants_to_replicate: Vec<Participant>,

    pub companies: GapAnalysis,
    pub credentials: GapAnalysis,
}

impl ReplicationAnalysis {
    /// Number of remote operations the executor will attempt
    pub fn total_operations(&self) -> usize {
        self.companies.to_create.len()
            + self.credentials.to_create.len()
            + self.participants_to_replicate.len()
    }

    /// Whether there is nothing to do
    pub fn is_empty(&self) -> bool {
        self.total_operations() == 0
    }

    /// Coarse upper bound on run time, assuming full throttling: one window
    /// per `effective_cap` operations. The executor's adaptive schedule is
    /// usually much faster.
    pub fn estimated_duration(&self) -> Duration {
        let config = RateLimiterConfig::default();
        let cap = config.effective_cap().max(1) as usize;
        let windows = self.total_operations().div_ceil(cap);
        config.window * windows as u32
    }
}

// ============================================================================
// Analysis
// ============================================================================

/// Diff the source shift against the target shift.
///
/// A source participant replicates iff its dedup key is not present among
/// the target participants' keys. Companies and credentials referenced by
/// the replicating participants are checked against the caller-supplied
/// collections by case-sensitive exact name.
pub fn analyze(request: ReplicationRequest) -> Result<ReplicationAnalysis, AnalysisError> {
    if request.source_shift_id.trim().is_empty() || request.target_shift_id.trim().is_empty() {
        return Err(AnalysisError::MissingShift);
    }
    if request.source_shift_id == request.target_shift_id {
        return Err(AnalysisError::SameShift);
    }
    if request.source_participants.is_empty() {
        return Err(AnalysisError::EmptySourceShift {
            shift: request.source_shift_id.clone(),
        });
    }

    let source_shift = ShiftKey::parse(&request.source_shift_id);
    let target_shift = ShiftKey::parse(&request.target_shift_id);

    // All participants of a shift belong to one event; the source list is
    // known non-empty at this point.
    let event_id = request.source_participants[0].event_id.clone();

    let target_keys: HashSet<String> = request
        .target_participants
        .iter()
        .map(Participant::dedup_key)
        .collect();

    let participants_to_replicate: Vec<Participant> = request
        .source_participants
        .iter()
        .filter(|p| !target_keys.contains(&p.dedup_key()))
        .cloned()
        .collect();

    let known_companies: HashSet<&str> = request
        .existing_companies
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    let companies = GapAnalysis::partition(
        participants_to_replicate.iter().map(|p| p.company.as_str()),
        &known_companies,
    );

    let known_credentials: HashSet<&str> = request
        .existing_credentials
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    let credentials = GapAnalysis::partition(
        participants_to_replicate
            .iter()
            .map(|p| p.credential_name.as_str()),
        &known_credentials,
    );

    Ok(ReplicationAnalysis {
        event_id,
        source_shift,
        target_shift,
        source_count: request.source_participants.len(),
        target_count: request.target_participants.len(),
        participants_to_replicate,
        companies,
        credentials,
    })
}

#[cfg(test)]
#[path = "analyzer_tests.rs"]
mod tests;
