use super::{CommandHandler, CommandResult};
use crate::config::SettingsLoader;
use crate::engine::{Delegator, Verdict};
use anyhow::Context;
use std::path::PathBuf;
use tracing::debug;

/// Handler for the `verify` command
pub struct VerifyCommand {
    pub target: PathBuf,
    pub role: String,
    pub ledger_dir: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub config: Option<PathBuf>,
}

impl CommandHandler for VerifyCommand {
    async fn execute(&self) -> anyhow::Result<CommandResult> {
        let settings = SettingsLoader::new()
            .with_config_path(self.config.clone())
            .with_ledger_dir(self.ledger_dir.clone())
            .with_hook_timeout(self.timeout)
            .load()
            .context("Failed to load settings")?;
        debug!("Verifying {:?} as '{}'", self.target, self.role);

        let delegator = Delegator::from_settings(&settings);
        debug!(
            "Ledger root {:?} ({}), hook timeout {:?}",
            delegator.ledger().root(),
            settings.ledger.source,
            delegator.runner().timeout()
        );
        let verdict = delegator
            .delegate(&self.target, &self.role)
            .await
            .with_context(|| format!("Verification of {} aborted", self.target.display()))?;

        self.report(&verdict);

        if verdict.passed() {
            Ok(CommandResult::Success)
        } else {
            Ok(CommandResult::Failure)
        }
    }

    fn name(&self) -> &'static str {
        "verify"
    }
}

impl VerifyCommand {
    /// Create new verify command
    pub fn new(
        target: PathBuf,
        role: String,
        ledger_dir: Option<PathBuf>,
        timeout: Option<u64>,
        config: Option<PathBuf>,
    ) -> Self {
        Self {
            target,
            role,
            ledger_dir,
            timeout,
            config,
        }
    }

    /// Echo the hook's streams, then summarize the recorded proof
    fn report(&self, verdict: &Verdict) {
        if let Some(output) = &verdict.output {
            if !output.stdout.is_empty() {
                println!("{}", output.stdout);
            }
            if !output.stderr.is_empty() {
                eprintln!("{}", output.stderr);
            }
        }

        let role = verdict.role().display_name();
        println!(
            "📝 {} Proof logged: {} -> {}",
            role, verdict.record.action, verdict.record.status
        );
        println!("   📍 Location: {}", verdict.ledger_file.display());

        if verdict.passed() {
            println!("✅ {} verification passed!", role);
        } else {
            println!(
                "❌ {} verification failed for {}",
                role,
                self.target.display()
            );
        }
    }
}
