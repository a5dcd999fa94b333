use super::types::{Settings, SettingsFile, DEFAULT_TRUTH_DIR};
use crate::engine::sandbox::DEFAULT_HOOK_TIMEOUT;
use crate::io::paths::{is_contained_path, LedgerLocator};
use crate::{OpenTruthError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable pointing at a settings file
pub const CONFIG_ENV: &str = "OPENTRUTH_CONFIG";

/// Environment variable overriding the hook timeout (seconds)
pub const HOOK_TIMEOUT_ENV: &str = "OPENTRUTH_HOOK_TIMEOUT";

/// Settings-relevant environment values, captured once
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    pub config: Option<PathBuf>,
    pub hook_timeout: Option<String>,
}

impl EnvSnapshot {
    pub fn from_process() -> Self {
        Self {
            config: std::env::var_os(CONFIG_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            hook_timeout: std::env::var(HOOK_TIMEOUT_ENV)
                .ok()
                .filter(|value| !value.is_empty()),
        }
    }
}

/// Builds [`Settings`] from CLI flags, environment, and an optional YAML file
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    config_path: Option<PathBuf>,
    ledger_dir: Option<PathBuf>,
    hook_timeout_secs: Option<u64>,
    env: EnvSnapshot,
    locator: LedgerLocator,
}

impl SettingsLoader {
    /// Loader reading from the running process
    pub fn new() -> Self {
        Self::with_environment(EnvSnapshot::from_process(), LedgerLocator::from_process())
    }

    pub fn with_environment(env: EnvSnapshot, locator: LedgerLocator) -> Self {
        Self {
            config_path: None,
            ledger_dir: None,
            hook_timeout_secs: None,
            env,
            locator,
        }
    }

    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn with_ledger_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.ledger_dir = dir;
        self
    }

    pub fn with_hook_timeout(mut self, secs: Option<u64>) -> Self {
        self.hook_timeout_secs = secs;
        self
    }

    pub fn load(self) -> Result<Settings> {
        let file = match self.config_path.as_ref().or(self.env.config.as_ref()) {
            Some(path) => load_settings_file(path)?,
            None => SettingsFile::default(),
        };

        let env_timeout = self
            .env
            .hook_timeout
            .as_deref()
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|_| {
                    OpenTruthError::Config(format!(
                        "{HOOK_TIMEOUT_ENV} must be a whole number of seconds, got '{raw}'"
                    ))
                })
            })
            .transpose()?;

        let hook_timeout = match self
            .hook_timeout_secs
            .or(env_timeout)
            .or(file.hook_timeout_secs)
        {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => Some(DEFAULT_HOOK_TIMEOUT),
        };

        let truth_dir = file
            .truth_dir
            .unwrap_or_else(|| DEFAULT_TRUTH_DIR.to_string());
        if !is_contained_path(Path::new(&truth_dir)) {
            return Err(OpenTruthError::Config(format!(
                "truth_dir must be a relative path inside the Rig, got '{truth_dir}'"
            )));
        }

        let ledger = self
            .locator
            .with_cli_override(self.ledger_dir)
            .with_settings_override(file.ledger_dir)
            .resolve();

        let settings = Settings {
            ledger,
            hook_timeout,
            truth_dir,
        };
        debug!("Resolved settings: {:?}", settings);
        Ok(settings)
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a settings file. A path that was named explicitly must exist.
pub fn load_settings_file(path: &Path) -> Result<SettingsFile> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        OpenTruthError::Config(format!(
            "Failed to read settings file {}: {}",
            path.display(),
            e
        ))
    })?;

    if contents.trim().is_empty() {
        return Ok(SettingsFile::default());
    }

    serde_yaml_ng::from_str(&contents).map_err(|e| {
        OpenTruthError::Config(format!(
            "Failed to parse settings file {}: {}",
            path.display(),
            e
        ))
    })
}
