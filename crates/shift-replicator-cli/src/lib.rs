//! # Shift Replicator CLI
//!
//! Command-line driver for the replication engine:
//! - `analyze` inspects the gap between two shifts (dry run, no writes)
//! - `replicate` executes the plan with live progress and Ctrl-C support
//! - `config` validates or prints the resolved configuration

use clap::{Parser, Subcommand};
use shift_replicator_client::{ConfigError, HttpStaffingBackend, ReplicatorConfig};
use shift_replicator_core::{
    analyze, format_duration, AnalysisError, ApiToken, BackendError, CancelHandle,
    ExecutorConfig, OperatorSession, ProgressObserver, ReplicationAnalysis, ReplicationExecutor,
    ReplicationPhase, ReplicationProgress, ReplicationRequest, ShiftKey, ValidationError,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

// ============================================================================
// CLI Structure
// ============================================================================

/// Shift Replicator - copy staffing records between event shifts
#[derive(Parser)]
#[command(name = "shift-replicator")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Replicates participants, companies and credentials between shifts")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SHIFT_REPLICATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level override
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Diff two shifts and print the replication plan (no writes)
    Analyze {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Execute the replication plan
    Replicate {
        #[command(flatten)]
        run: RunArgs,

        /// Execute without the plan-only preview
        #[arg(short, long)]
        yes: bool,
    },

    /// Validate or inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments shared by analyze and replicate
#[derive(Debug, clap::Args)]
pub struct RunArgs {
    /// Event the shifts belong to
    #[arg(short, long)]
    pub event: String,

    /// Source shift key (YYYY-MM-DD-stage-period)
    #[arg(short, long)]
    pub source: String,

    /// Target shift key (YYYY-MM-DD-stage-period)
    #[arg(short, long)]
    pub target: String,

    /// Operator name for audit attribution
    #[arg(long, env = "SHIFT_REPLICATOR_OPERATOR")]
    pub operator: String,

    /// API token
    #[arg(long, env = "SHIFT_REPLICATOR_TOKEN", hide_env_values = true)]
    pub token: String,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Check that the resolved configuration is usable
    Validate,

    /// Print the resolved configuration as TOML
    Show,
}

// ============================================================================
// Errors
// ============================================================================

/// CLI failures, mapped to exit codes in `main`
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    #[error("client error: {0}")]
    Client(#[from] shift_replicator_client::ClientError),

    #[error("analysis rejected: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("API call failed: {0}")]
    Backend(#[from] BackendError),

    #[error("replication failed: {summary}")]
    ReplicationFailed { summary: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

// ============================================================================
// Entry Point
// ============================================================================

/// Parse arguments and run the selected command.
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = ReplicatorConfig::load(cli.config.as_deref())?;

    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    init_logging(level, cli.json_logs || config.logging.json_format);

    match cli.command {
        Commands::Analyze { run } => {
            let (analysis, _) = load_and_analyze(&config, &run).await?;
            print_analysis(&analysis);
            Ok(())
        }
        Commands::Replicate { run, yes } => replicate(&config, &run, yes).await,
        Commands::Config { action } => match action {
            ConfigAction::Validate => {
                config.validate()?;
                println!("configuration ok");
                Ok(())
            }
            ConfigAction::Show => {
                let rendered = toml::to_string_pretty(&config)
                    .map_err(|e| CliError::Serialization(e.to_string()))?;
                println!("{rendered}");
                Ok(())
            }
        },
    }
}

/// Initialize the tracing subscriber.
fn init_logging(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Fetch both shifts plus the event's entities and run the analyzer.
async fn load_and_analyze(
    config: &ReplicatorConfig,
    run: &RunArgs,
) -> Result<(ReplicationAnalysis, HttpStaffingBackend), CliError> {
    let session = OperatorSession::new(&run.operator, ApiToken::new(&run.token))?;
    let backend = HttpStaffingBackend::new(&config.api, session)?;

    let event_id = run.event.parse()?;
    let source = ShiftKey::parse(&run.source);
    let target = ShiftKey::parse(&run.target);

    info!(%source, %target, "loading shift data");
    let source_participants = backend
        .fetch_participants_by_shift(&event_id, &source)
        .await?;
    let target_participants = backend
        .fetch_participants_by_shift(&event_id, &target)
        .await?;
    let existing_companies = backend.fetch_companies(&event_id).await?;
    let existing_credentials = backend.fetch_credentials(&event_id).await?;

    let analysis = analyze(ReplicationRequest {
        source_shift_id: run.source.clone(),
        target_shift_id: run.target.clone(),
        source_participants,
        target_participants,
        existing_companies,
        existing_credentials,
    })?;

    Ok((analysis, backend))
}

/// Print the plan the executor would walk.
fn print_analysis(analysis: &ReplicationAnalysis) {
    println!(
        "source shift {} has {} participants, target {} has {}",
        analysis.source_shift.describe(),
        analysis.source_count,
        analysis.target_shift.describe(),
        analysis.target_count,
    );
    println!(
        "participants to replicate: {}",
        analysis.participants_to_replicate.len()
    );
    println!(
        "companies to create: {:?} (existing: {})",
        analysis.companies.to_create,
        analysis.companies.existing.len()
    );
    println!(
        "credentials to create: {:?} (existing: {})",
        analysis.credentials.to_create,
        analysis.credentials.existing.len()
    );
    println!(
        "total operations: {} (worst-case {})",
        analysis.total_operations(),
        format_duration(analysis.estimated_duration())
    );
}

/// Analyze and, when confirmed, execute.
async fn replicate(config: &ReplicatorConfig, run: &RunArgs, yes: bool) -> Result<(), CliError> {
    let (analysis, backend) = load_and_analyze(config, run).await?;
    print_analysis(&analysis);

    if analysis.is_empty() {
        println!("nothing to replicate");
        return Ok(());
    }

    if !yes {
        println!("dry run only; pass --yes to execute");
        return Ok(());
    }

    let session = OperatorSession::new(&run.operator, ApiToken::new(&run.token))?;
    let executor = ReplicationExecutor::with_config(
        Arc::new(backend),
        session,
        ExecutorConfig {
            batch_size: 10,
            rate_limiter: config.rate_limit.to_limiter_config(),
        },
    );

    let cancel = CancelHandle::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing current operation");
            ctrl_c.cancel();
        }
    });

    let report = executor.execute(analysis, &LogObserver, &cancel).await;

    println!("{}", report.summary);
    for failure in &report.failures {
        println!(
            "  failed [{}] {}: {}",
            failure.phase, failure.item, failure.error
        );
    }

    if report.success() || report.error_count == 0 {
        Ok(())
    } else {
        Err(CliError::ReplicationFailed {
            summary: report.summary,
        })
    }
}

// ============================================================================
// Progress Output
// ============================================================================

/// Observer that logs each step with phase, counters and ETA.
struct LogObserver;

impl ProgressObserver for LogObserver {
    fn on_progress(&self, progress: &ReplicationProgress, phase: ReplicationPhase) {
        let eta = progress
            .estimated_time_remaining
            .map(format_duration)
            .unwrap_or_else(|| "?".to_string());

        info!(
            phase = %phase,
            step = progress.current,
            total = progress.total,
            batch = progress.current_batch,
            batches = progress.total_batches,
            participant = progress.current_participant.as_deref().unwrap_or("-"),
            eta,
            "replicating"
        );
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
