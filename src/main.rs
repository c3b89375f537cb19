use clap::Parser;
use std::process::ExitCode;
use task_swarm::{
    cli::{execute_run, Cli},
    engine::RunOutcome,
    logging::{self, LogConfig},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&LogConfig::from_env().with_silent(cli.silent));

    match execute_run(&cli).await {
        Ok(RunOutcome::Coordinator(summary)) => {
            tracing::debug!(
                items = summary.total_items,
                requests = summary.requests_received,
                "all workers finished"
            );
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Worker(_)) => ExitCode::SUCCESS,
        Err(error) => {
            // 起動後の失敗はレポーター経由で記録済み
            if error.is_configuration() {
                eprintln!("task_swarm: {error}");
            }
            ExitCode::FAILURE
        }
    }
}
