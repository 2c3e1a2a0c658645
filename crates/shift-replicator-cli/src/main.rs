use shift_replicator_cli::{run_cli, CliError};
use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(e) = run_cli().await {
        error!("{}", e);

        let exit_code = match e {
            CliError::Configuration(_) => 1,
            CliError::InvalidArgument(_) => 2,
            CliError::Client(_) => 3,
            CliError::Analysis(_) => 4,
            CliError::Backend(_) => 5,
            CliError::ReplicationFailed { .. } => 6,
            CliError::Serialization(_) => 7,
        };

        std::process::exit(exit_code);
    }
}
