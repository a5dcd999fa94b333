pub mod hooks;
pub mod verify;

use crate::OpenTruthError;

/// Common trait for all command handlers
#[allow(async_fn_in_trait)]
pub trait CommandHandler {
    /// Execute the command
    async fn execute(&self) -> anyhow::Result<CommandResult>;

    /// Get command name for logging
    fn name(&self) -> &'static str;
}

/// Command execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Verification passed, or a read-only command completed
    Success,
    /// Verification ran and did not pass
    Failure,
}

impl CommandResult {
    /// Convert to exit code
    pub fn exit_code(&self) -> u8 {
        match self {
            CommandResult::Success => 0,
            CommandResult::Failure => 1,
        }
    }
}

/// Exit code for a command that could not complete.
///
/// `2` for usage errors, `3` when a proof could not be recorded, `1` otherwise.
pub fn exit_code_for_error(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<OpenTruthError>() {
        Some(e) if e.is_usage() => 2,
        Some(OpenTruthError::Ledger { .. }) => 3,
        _ => 1,
    }
}
