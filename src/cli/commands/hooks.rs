use super::{CommandHandler, CommandResult};
use crate::config::SettingsLoader;
use crate::engine::{Delegator, Role};
use crate::OpenTruthError;
use anyhow::Context;
use std::path::PathBuf;

/// Handler for the `hooks` command. Read-only: never runs a hook or touches the ledger.
pub struct HooksCommand {
    pub target: PathBuf,
    pub config: Option<PathBuf>,
}

impl CommandHandler for HooksCommand {
    async fn execute(&self) -> anyhow::Result<CommandResult> {
        if !self.target.exists() {
            return Err(OpenTruthError::TargetNotFound(self.target.clone()).into());
        }
        let root = std::fs::canonicalize(&self.target)
            .with_context(|| format!("Failed to resolve {}", self.target.display()))?;

        let settings = SettingsLoader::new()
            .with_config_path(self.config.clone())
            .load()
            .context("Failed to load settings")?;
        let delegator = Delegator::from_settings(&settings);

        println!("Hooks for {} ({}):", root.display(), delegator.truth_dir());
        for role in Role::all() {
            let selected = match delegator.locate_hook(&root, *role) {
                Some(hook) => hook.file_name,
                None => "missing".to_string(),
            };
            println!("  {:<8} {:<14} {}", role.as_str(), role.check_name(), selected);
        }

        Ok(CommandResult::Success)
    }

    fn name(&self) -> &'static str {
        "hooks"
    }
}

impl HooksCommand {
    pub fn new(target: PathBuf, config: Option<PathBuf>) -> Self {
        Self { target, config }
    }
}
