//! OpenTruth - delegated verification coordinator
//!
//! Parses arguments, initializes tracing, dispatches to a command handler and
//! maps its outcome to the process exit status.

use clap::Parser;
use opentruth::cli::commands::{
    exit_code_for_error, hooks::HooksCommand, verify::VerifyCommand, CommandHandler,
};
use opentruth::cli::{Cli, Commands, LogLevel};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Initialize tracing from `--log-level`; `RUST_LOG` wins when set.
fn initialize_tracing(log_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // stdout carries hook output and the summary
        .init();
}

async fn dispatch(command: Commands) -> anyhow::Result<u8> {
    debug!(
        writes_ledger = command.writes_ledger(),
        "Parsed '{}' command",
        command.name()
    );
    let result = match command {
        Commands::Verify {
            target,
            role,
            ledger_dir,
            timeout,
            config,
        } => {
            let handler = VerifyCommand::new(target, role, ledger_dir, timeout, config);
            debug!("Dispatching '{}'", handler.name());
            handler.execute().await?
        }
        Commands::Hooks { target, config } => {
            let handler = HooksCommand::new(target, config);
            debug!("Dispatching '{}'", handler.name());
            handler.execute().await?
        }
    };
    Ok(result.exit_code())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_tracing(cli.log_level);

    match dispatch(cli.command).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("❌ {e:#}");
            ExitCode::from(exit_code_for_error(&e))
        }
    }
}
