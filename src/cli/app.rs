use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// OpenTruth: delegated verification for Rigs
#[derive(Parser, Debug)]
#[command(name = "opentruth")]
#[command(version)]
#[command(about = "Delegated verification for Rigs with an append-only truth ledger")]
#[command(
    long_about = "OpenTruth runs the verification hook a Rig ships for a role (e.g. .truth/verify_logic) and records the outcome as an immutable proof in the truth ledger."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log verbosity (RUST_LOG overrides)
    #[arg(long, value_enum, default_value = "warn", global = true)]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a Rig's hook for a role and record the proof
    Verify {
        /// Path to the Rig to verify
        #[arg(long)]
        target: PathBuf,

        /// Inspection role (gauger = logic, spotter = visual)
        #[arg(long)]
        role: String,

        /// Ledger directory (overrides OPENTRUTH_LEDGER_DIR and the settings file)
        #[arg(long)]
        ledger_dir: Option<PathBuf>,

        /// Hook timeout in seconds, 0 to disable
        #[arg(long)]
        timeout: Option<u64>,

        /// Settings file (YAML)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show which hook each role would run for a Rig, without running it
    Hooks {
        /// Path to the Rig to inspect
        #[arg(long)]
        target: PathBuf,

        /// Settings file (YAML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Commands {
    /// Get the command name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Verify { .. } => "verify",
            Commands::Hooks { .. } => "hooks",
        }
    }

    /// Check if this command appends to the ledger
    pub fn writes_ledger(&self) -> bool {
        matches!(self, Commands::Verify { .. })
    }
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
