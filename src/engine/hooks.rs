//! Hook discovery inside a Rig's truth directory
//!
//! A Rig participates in the protocol by shipping an executable named after
//! the check, optionally carrying one of the suffixes in [`HOOK_SUFFIXES`].
//! When several candidates exist the first one in suffix order wins; the
//! directory listing order never matters.

use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Recognized hook suffixes, highest priority first
pub const HOOK_SUFFIXES: &[&str] = &["", ".sh", ".py", ".js", ".rb"];

/// A hook selected for execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHook {
    /// Absolute or truth-dir-relative path to the executable
    pub path: PathBuf,
    /// File name as recorded in proofs, e.g. `verify_logic.sh`
    pub file_name: String,
}

/// Locates the single hook implementing a check
#[derive(Debug, Clone, Default)]
pub struct HookResolver;

impl HookResolver {
    pub fn new() -> Self {
        Self
    }

    /// Candidate file names for `check`, in priority order
    pub fn candidates(&self, check: &str) -> Vec<String> {
        HOOK_SUFFIXES
            .iter()
            .map(|suffix| format!("{check}{suffix}"))
            .collect()
    }

    /// Return the first candidate that exists and is executable
    pub fn find(&self, truth_dir: &Path, check: &str) -> Option<ResolvedHook> {
        for file_name in self.candidates(check) {
            let path = truth_dir.join(&file_name);
            if is_executable(&path) {
                debug!("Resolved hook for '{}': {:?}", check, path);
                return Some(ResolvedHook { path, file_name });
            }
            trace!("Hook candidate not usable: {:?}", path);
        }

        debug!("No hook for '{}' in {:?}", check, truth_dir);
        None
    }
}

/// Regular file (symlinks followed) with an execute bit set
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::metadata(path) {
        Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}
