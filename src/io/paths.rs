use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Environment variable naming the ledger root explicitly
pub const LEDGER_DIR_ENV: &str = "OPENTRUTH_LEDGER_DIR";

/// Ledger location below the town root of a standard installation
pub const CANONICAL_LEDGER_SUBDIR: &str = "data/truth_ledger";

/// Ledger location below the current directory when no town layout exists
pub const FALLBACK_LEDGER_SUBDIR: &str = "history/proofs";

/// Where the resolved ledger root came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerSource {
    CliFlag,
    Environment,
    SettingsFile,
    Installation,
    WorkingDirectory,
}

impl std::fmt::Display for LedgerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LedgerSource::CliFlag => "--ledger-dir",
            LedgerSource::Environment => LEDGER_DIR_ENV,
            LedgerSource::SettingsFile => "settings file",
            LedgerSource::Installation => "installation layout",
            LedgerSource::WorkingDirectory => "working directory fallback",
        };
        f.write_str(label)
    }
}

/// A ledger root resolved once per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerLocation {
    pub root: PathBuf,
    pub source: LedgerSource,
}

/// Inputs for ledger root resolution.
///
/// Precedence: CLI flag, environment, settings file, installation layout
/// (only when it exists on disk), then `./history/proofs`.
#[derive(Debug, Clone, Default)]
pub struct LedgerLocator {
    pub cli_override: Option<PathBuf>,
    pub env_override: Option<PathBuf>,
    pub settings_override: Option<PathBuf>,
    pub executable: Option<PathBuf>,
    pub current_dir: PathBuf,
}

impl LedgerLocator {
    /// Locator seeded from the running process (env var, executable, cwd)
    pub fn from_process() -> Self {
        Self {
            cli_override: None,
            env_override: std::env::var_os(LEDGER_DIR_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            settings_override: None,
            executable: std::env::current_exe().ok(),
            current_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    pub fn with_cli_override(mut self, dir: Option<PathBuf>) -> Self {
        self.cli_override = dir;
        self
    }

    pub fn with_settings_override(mut self, dir: Option<PathBuf>) -> Self {
        self.settings_override = dir;
        self
    }

    pub fn resolve(&self) -> LedgerLocation {
        let explicit = [
            (&self.cli_override, LedgerSource::CliFlag),
            (&self.env_override, LedgerSource::Environment),
            (&self.settings_override, LedgerSource::SettingsFile),
        ];

        let location = explicit
            .into_iter()
            .find_map(|(dir, source)| {
                dir.as_ref().map(|dir| LedgerLocation {
                    root: self.anchor(dir),
                    source,
                })
            })
            .or_else(|| {
                self.executable
                    .as_deref()
                    .and_then(canonical_ledger_root)
                    .filter(|root| root.is_dir())
                    .map(|root| LedgerLocation {
                        root,
                        source: LedgerSource::Installation,
                    })
            })
            .unwrap_or_else(|| LedgerLocation {
                root: self.current_dir.join(FALLBACK_LEDGER_SUBDIR),
                source: LedgerSource::WorkingDirectory,
            });

        debug!(
            "Ledger root {:?} (from {})",
            location.root, location.source
        );
        location
    }

    fn anchor(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.current_dir.join(dir)
        }
    }
}

/// `<exe dir>/../../../data/truth_ledger`, for a binary installed as
/// `<town>/tools/opentruth/bin/opentruth`
pub fn canonical_ledger_root(executable: &Path) -> Option<PathBuf> {
    executable
        .parent()?
        .ancestors()
        .nth(3)
        .map(|town_root| town_root.join(CANONICAL_LEDGER_SUBDIR))
}

/// Relative path that stays beneath its base (no `..`, no root)
pub fn is_contained_path(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && path.components().any(|c| matches!(c, Component::Normal(_)))
}
