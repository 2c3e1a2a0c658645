//! Replication executor.
//!
//! Walks a [`ReplicationAnalysis`] in three strictly ordered phases
//! (companies, credentials, participants), issuing one remote call at a
//! time, pacing every call through the rate limiter and tolerating per-item
//! failure. One long-lived cooperative task: no internal parallelism, so the
//! progress snapshot and the limiter window have exactly one writer by
//! construction.
//!
//! The phase order is a hard invariant. Participants reference companies and
//! credential types by name, so those must exist before any participant copy
//! is attempted. Do not parallelize phases or items: the sequential
//! rate-limited discipline is part of the contract with the remote API.

use crate::analyzer::ReplicationAnalysis;
use crate::backend::{
    BackendError, NewCompany, NewCredential, NewParticipant, StaffingBackend,
    DEFAULT_CREDENTIAL_COLOR,
};
use crate::progress::{ProgressObserver, ReplicationPhase, ReplicationProgress};
use crate::rate_limiter::{AdaptiveRateLimiter, RateLimiterConfig};
use crate::session::OperatorSession;
use crate::ReplicationRunId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

// ============================================================================
// Cancellation
// ============================================================================

/// Cooperative cancellation flag, checked before every remote call.
///
/// Clone the handle and call [`CancelHandle::cancel`] from anywhere (a
/// Ctrl-C handler, a UI button); the run stops before its next suspension
/// point and reports the partial tally.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Create a fresh, un-cancelled handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the run holding this handle
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Configuration and Report
// ============================================================================

/// Tuning for [`ReplicationExecutor`].
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Participant batch size, progress/ETA bucketing only (no parallelism,
    /// no transactional meaning)
    pub batch_size: usize,

    /// Rate limiter tuning for this run
    pub rate_limiter: RateLimiterConfig,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            rate_limiter: RateLimiterConfig::default(),
        }
    }
}

/// Aggregate outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationOutcome {
    /// Every operation succeeded
    FullSuccess,

    /// Some operations succeeded, some failed
    PartialSuccess,

    /// Every operation failed
    Failed,

    /// The plan was empty, nothing was attempted
    NoOp,

    /// Cancellation stopped the run before completion
    Cancelled,
}

impl ReplicationOutcome {
    /// Whether anything was replicated
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ReplicationOutcome::FullSuccess | ReplicationOutcome::PartialSuccess
        )
    }
}

/// One failed item, kept for the final report.
#[derive(Debug, Clone)]
pub struct ItemFailure {
    pub phase: ReplicationPhase,

    /// Entity or participant name the call was for
    pub item: String,

    pub error: String,

    /// Whether a re-run could plausibly succeed
    pub transient: bool,
}

/// Final tally of a run.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub run_id: ReplicationRunId,
    pub outcome: ReplicationOutcome,
    pub success_count: usize,
    pub error_count: usize,
    pub failures: Vec<ItemFailure>,

    /// Human-readable summary naming the target shift
    pub summary: String,

    pub elapsed: Duration,
}

impl ExecutionReport {
    /// Whether anything was replicated
    pub fn success(&self) -> bool {
        self.outcome.is_success()
    }
}

// ============================================================================
// Executor
// ============================================================================

/// Drives one replication run against a [`StaffingBackend`].
///
/// Concurrent runs on the same executor are not supported; callers must
/// serialize (e.g. disable the action while a run is pending).
pub struct ReplicationExecutor {
    backend: Arc<dyn StaffingBackend>,
    session: OperatorSession,
    config: ExecutorConfig,
}

impl ReplicationExecutor {
    /// Create an executor with default tuning
    pub fn new(backend: Arc<dyn StaffingBackend>, session: OperatorSession) -> Self {
        Self::with_config(backend, session, ExecutorConfig::default())
    }

    /// Create an executor with explicit tuning
    pub fn with_config(
        backend: Arc<dyn StaffingBackend>,
        session: OperatorSession,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            backend,
            session,
            config,
        }
    }

    /// Execute a replication plan.
    ///
    /// Consumes the analysis: a plan is executed at most once, re-running
    /// requires a fresh analysis (which naturally excludes the participants
    /// that already made it into the target shift).
    #[instrument(skip_all, fields(
        source = %analysis.source_shift,
        target = %analysis.target_shift,
        operations = analysis.total_operations(),
    ))]
    pub async fn execute(
        &self,
        analysis: ReplicationAnalysis,
        observer: &dyn ProgressObserver,
        cancel: &CancelHandle,
    ) -> ExecutionReport {
        let run_id = ReplicationRunId::new();
        let target = analysis.target_shift.clone();

        if analysis.is_empty() {
            info!(%run_id, "empty plan, nothing to replicate");
            return ExecutionReport {
                run_id,
                outcome: ReplicationOutcome::NoOp,
                success_count: 0,
                error_count: 0,
                failures: Vec::new(),
                summary: format!("nothing to replicate into shift {}", target.describe()),
                elapsed: Duration::ZERO,
            };
        }

        let batch_size = self.config.batch_size.max(1);
        let total = analysis.total_operations();
        let total_batches = analysis
            .participants_to_replicate
            .len()
            .div_ceil(batch_size);

        info!(%run_id, total, "starting replication run");

        let mut run = RunState {
            backend: self.backend.as_ref(),
            limiter: AdaptiveRateLimiter::new(self.config.rate_limiter.clone()),
            observer,
            cancel,
            started: Instant::now(),
            total,
            progress: ReplicationProgress::new(total, total_batches),
            success_count: 0,
            error_count: 0,
            failures: Vec::new(),
            cancelled: false,
        };

        self.run_companies(&analysis, &mut run).await;
        self.run_credentials(&analysis, &mut run).await;
        self.run_participants(&analysis, batch_size, &mut run).await;

        // Downstream views are stale as soon as anything was attempted.
        // A failure here is contained like any other: logged and counted.
        if run.success_count > 0 || run.error_count > 0 {
            if let Err(e) = self.backend.invalidate_caches(&analysis.event_id).await {
                warn!(%run_id, error = %e, "cache invalidation failed");
                run.error_count += 1;
            }
        }

        let elapsed = run.started.elapsed();
        let outcome = if run.cancelled {
            ReplicationOutcome::Cancelled
        } else if run.error_count == 0 {
            ReplicationOutcome::FullSuccess
        } else if run.success_count > 0 {
            ReplicationOutcome::PartialSuccess
        } else {
            ReplicationOutcome::Failed
        };

        let summary = match outcome {
            ReplicationOutcome::FullSuccess => format!(
                "replicated {} records into shift {}",
                run.success_count,
                target.describe()
            ),
            ReplicationOutcome::PartialSuccess => format!(
                "replicated {} records into shift {}; {} of {} operations failed",
                run.success_count,
                target.describe(),
                run.error_count,
                total
            ),
            ReplicationOutcome::Failed => format!(
                "replication into shift {} failed: all {} operations failed",
                target.describe(),
                run.error_count
            ),
            ReplicationOutcome::Cancelled => format!(
                "replication into shift {} cancelled after {} of {} operations",
                target.describe(),
                run.progress.processed,
                total
            ),
            // Handled by the early return above.
            ReplicationOutcome::NoOp => unreachable!(),
        };

        info!(
            %run_id,
            success = run.success_count,
            errors = run.error_count,
            elapsed_ms = elapsed.as_millis() as u64,
            "replication run finished"
        );

        ExecutionReport {
            run_id,
            outcome,
            success_count: run.success_count,
            error_count: run.error_count,
            failures: run.failures,
            summary,
            elapsed,
        }
    }

    /// Phase 1: create the missing companies, tagged with the target shift.
    async fn run_companies(&self, analysis: &ReplicationAnalysis, run: &mut RunState<'_>) {
        for name in &analysis.companies.to_create {
            if run.check_cancelled() {
                return;
            }

            run.begin_step(ReplicationPhase::Companies, None);
            let result = run
                .backend
                .create_company(NewCompany {
                    name: name.clone(),
                    event_id: analysis.event_id.clone(),
                    shift: analysis.target_shift.clone(),
                })
                .await
                .map(drop);
            run.finish_step(ReplicationPhase::Companies, name, result).await;
        }
    }

    /// Phase 2: create the missing credential types, seeded with the target
    /// date and the default color.
    async fn run_credentials(&self, analysis: &ReplicationAnalysis, run: &mut RunState<'_>) {
        for name in &analysis.credentials.to_create {
            if run.check_cancelled() {
                return;
            }

            run.begin_step(ReplicationPhase::Credentials, None);
            let result = run
                .backend
                .create_credential(NewCredential {
                    name: name.clone(),
                    event_id: analysis.event_id.clone(),
                    color: DEFAULT_CREDENTIAL_COLOR.to_string(),
                    days_works: vec![analysis.target_shift.date_iso().to_string()],
                    shift: analysis.target_shift.clone(),
                })
                .await
                .map(drop);
            run.finish_step(ReplicationPhase::Credentials, name, result).await;
        }
    }

    /// Phase 3: copy participants in fixed-size batches. Batches and items
    /// are both sequential; batching only buckets progress and ETA.
    async fn run_participants(
        &self,
        analysis: &ReplicationAnalysis,
        batch_size: usize,
        run: &mut RunState<'_>,
    ) {
        for batch in analysis.participants_to_replicate.chunks(batch_size) {
            run.progress.current_batch += 1;

            for participant in batch {
                if run.check_cancelled() {
                    return;
                }

                run.begin_step(ReplicationPhase::Participants, Some(&participant.name));
                let result = run
                    .backend
                    .create_participant(NewParticipant {
                        event_id: analysis.event_id.clone(),
                        name: participant.name.clone(),
                        cpf: participant.cpf.clone(),
                        rg: participant.rg.clone(),
                        company: participant.company.clone(),
                        role: participant.role.clone(),
                        days_work: vec![analysis.target_shift.date_iso().to_string()],
                        credential_id: participant.credential_id.clone(),
                        validated_by: self.session.validated_by(),
                        shift: analysis.target_shift.clone(),
                    })
                    .await
                    .map(drop);
                run.finish_step(ReplicationPhase::Participants, &participant.name, result)
                    .await;
            }
        }
    }
}

// ============================================================================
// Run State
// ============================================================================

/// Mutable bookkeeping for one run, single writer by construction.
struct RunState<'a> {
    backend: &'a dyn StaffingBackend,
    limiter: AdaptiveRateLimiter,
    observer: &'a dyn ProgressObserver,
    cancel: &'a CancelHandle,
    started: Instant,
    total: usize,
    progress: ReplicationProgress,
    success_count: usize,
    error_count: usize,
    failures: Vec<ItemFailure>,
    cancelled: bool,
}

impl RunState<'_> {
    /// Latch the cancellation flag; once set, every phase returns early.
    fn check_cancelled(&mut self) -> bool {
        if self.cancelled {
            return true;
        }
        if self.cancel.is_cancelled() {
            info!("cancellation requested, stopping before next remote call");
            self.cancelled = true;
        }
        self.cancelled
    }

    /// Refresh the progress snapshot and notify the observer, synchronously,
    /// before the remote call is awaited.
    fn begin_step(&mut self, phase: ReplicationPhase, participant: Option<&str>) {
        self.progress.current_participant = participant.map(str::to_string);
        self.progress.advance(self.started.elapsed());
        self.observer.on_progress(&self.progress, phase);
    }

    /// Record an attempt and pace the next one through the limiter.
    ///
    /// Per-item failures never abort the batch: they are logged, counted and
    /// the run moves on.
    async fn finish_step(
        &mut self,
        phase: ReplicationPhase,
        item: &str,
        result: Result<(), BackendError>,
    ) {
        self.progress.processed += 1;

        match result {
            Ok(()) => {
                self.success_count += 1;
            }
            Err(e) => {
                warn!(phase = %phase, item, error = %e, "creation failed, continuing");
                self.error_count += 1;
                self.failures.push(ItemFailure {
                    phase,
                    item: item.to_string(),
                    error: e.to_string(),
                    transient: e.is_transient(),
                });
            }
        }

        let remaining = self.total - self.progress.processed;
        self.limiter.wait_for_turn(remaining).await;
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
