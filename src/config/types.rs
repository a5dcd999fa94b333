use crate::io::paths::LedgerLocation;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Directory inside a Rig that holds its hooks
pub const DEFAULT_TRUTH_DIR: &str = ".truth";

/// On-disk settings file (YAML). Every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    /// Ledger root; relative paths are taken from the current directory
    #[serde(default)]
    pub ledger_dir: Option<PathBuf>,

    /// Per-hook timeout in seconds; `0` disables it
    #[serde(default)]
    pub hook_timeout_secs: Option<u64>,

    /// Hook directory name inside each Rig
    #[serde(default)]
    pub truth_dir: Option<String>,
}

/// Fully resolved settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub ledger: LedgerLocation,
    pub hook_timeout: Option<Duration>,
    pub truth_dir: String,
}
