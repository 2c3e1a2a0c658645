//! Progress reporting for replication runs.
//!
//! The executor updates one [`ReplicationProgress`] snapshot per remote call
//! and hands it to a caller-supplied [`ProgressObserver`] synchronously,
//! before awaiting the call. Formatting helpers are pure and callable with
//! any snapshot.

use std::time::Duration;

// ============================================================================
// Phases
// ============================================================================

/// The three ordered phases of a replication run.
///
/// Participants depend on companies and credentials existing first, so the
/// numbering doubles as the execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplicationPhase {
    /// Creating missing companies
    Companies,

    /// Creating missing credential types
    Credentials,

    /// Copying participants into the target shift
    Participants,
}

impl ReplicationPhase {
    /// Phase number, 1-based
    pub fn number(&self) -> u8 {
        match self {
            ReplicationPhase::Companies => 1,
            ReplicationPhase::Credentials => 2,
            ReplicationPhase::Participants => 3,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ReplicationPhase::Companies => "companies",
            ReplicationPhase::Credentials => "credentials",
            ReplicationPhase::Participants => "participants",
        }
    }
}

impl std::fmt::Display for ReplicationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Progress Snapshot
// ============================================================================

/// Point-in-time view of a replication run.
///
/// Initialized from the analysis operation count, updated once per remote
/// call, discarded when the run completes.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationProgress {
    /// Total operations the run will attempt
    pub total: usize,

    /// 1-based index of the operation about to run
    pub current: usize,

    /// Operations already attempted (success or failure)
    pub processed: usize,

    /// Name of the participant being copied, when in phase 3
    pub current_participant: Option<String>,

    /// ETA derived from the observed average per-operation time
    pub estimated_time_remaining: Option<Duration>,

    /// Wall time since the run started
    pub elapsed: Duration,

    /// 1-based participant batch counter (phase 3 only)
    pub current_batch: usize,

    /// Total participant batches
    pub total_batches: usize,

    /// Observed operations per minute
    pub operations_per_minute: f64,
}

impl ReplicationProgress {
    /// Fresh snapshot for a run of `total` operations split into
    /// `total_batches` participant batches.
    pub fn new(total: usize, total_batches: usize) -> Self {
        Self {
            total,
            current: 0,
            processed: 0,
            current_participant: None,
            estimated_time_remaining: None,
            elapsed: Duration::ZERO,
            current_batch: 0,
            total_batches,
            operations_per_minute: 0.0,
        }
    }

    /// Advance to the next operation and refresh the derived figures.
    pub(crate) fn advance(&mut self, elapsed: Duration) {
        self.current += 1;
        self.elapsed = elapsed;

        if self.processed > 0 && !elapsed.is_zero() {
            let avg = elapsed / self.processed as u32;
            let remaining = self.total.saturating_sub(self.processed);
            self.estimated_time_remaining = Some(avg * remaining as u32);
            self.operations_per_minute = self.processed as f64 * 60.0 / elapsed.as_secs_f64();
        }
    }

    /// Completion ratio in `[0, 1]`
    pub fn completion(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.processed as f64 / self.total as f64
    }
}

// ============================================================================
// Observer
// ============================================================================

/// Caller-supplied sink for progress snapshots.
///
/// Invoked synchronously before each remote call; implementations must not
/// block.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: &ReplicationProgress, phase: ReplicationPhase);
}

/// Observer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn on_progress(&self, _progress: &ReplicationProgress, _phase: ReplicationPhase) {}
}

// ============================================================================
// Formatting
// ============================================================================

/// Render a duration for humans: seconds under a minute, minutes and seconds
/// under an hour, hours and minutes beyond that.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    if total_seconds < 60 {
        format!("{}s", total_seconds)
    } else if total_seconds < 3600 {
        format!("{}m {:02}s", total_seconds / 60, total_seconds % 60)
    } else {
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        format!("{}h {:02}m", hours, minutes)
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
