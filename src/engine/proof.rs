//! Proof records
//!
//! A proof describes one verification attempt. It is built in memory, written
//! as one ledger line, and never touched again.

use super::hooks::ResolvedHook;
use super::roles::Role;
use super::sandbox::{HookOutput, SandboxError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Outcome class of a verification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofStatus {
    /// Hook ran and exited 0
    Success,
    /// Hook ran and exited nonzero, or the Rig has no hook
    Failure,
    /// Hook could not be run to completion
    Error,
}

impl std::fmt::Display for ProofStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProofStatus::Success => write!(f, "success"),
            ProofStatus::Failure => write!(f, "failure"),
            ProofStatus::Error => write!(f, "error"),
        }
    }
}

/// Machine-readable reason carried in `details.error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofError {
    MissingHook,
    SpawnFailed,
    WaitFailed,
    Timeout,
    Interrupted,
}

impl From<&SandboxError> for ProofError {
    fn from(err: &SandboxError) -> Self {
        match err {
            SandboxError::Spawn(_) => ProofError::SpawnFailed,
            SandboxError::Wait(_) => ProofError::WaitFailed,
            SandboxError::TimedOut(_) => ProofError::Timeout,
            SandboxError::Interrupted(_) => ProofError::Interrupted,
        }
    }
}

/// Role- and outcome-specific payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProofDetails {
    /// The hook ran; its exit code and streams are kept for diagnosis
    Executed {
        hook: String,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
    /// The Rig ships no usable hook for the role's check
    MissingHook {
        error: ProofError,
        check: String,
        truth_dir: String,
        searched: Vec<String>,
    },
    /// The hook was found but could not be run to completion
    ExecutionError {
        error: ProofError,
        hook: String,
        message: String,
    },
}

impl ProofDetails {
    pub fn executed(hook: &ResolvedHook, output: &HookOutput) -> Self {
        ProofDetails::Executed {
            hook: hook.file_name.clone(),
            exit_code: output.exit_code,
            stdout: output.stdout.clone(),
            stderr: output.stderr.clone(),
        }
    }

    pub fn missing_hook(check: &str, truth_dir: &str, searched: Vec<String>) -> Self {
        ProofDetails::MissingHook {
            error: ProofError::MissingHook,
            check: check.to_string(),
            truth_dir: truth_dir.to_string(),
            searched,
        }
    }

    pub fn execution_error(hook: &ResolvedHook, err: &SandboxError) -> Self {
        ProofDetails::ExecutionError {
            error: ProofError::from(err),
            hook: hook.file_name.clone(),
            message: err.to_string(),
        }
    }

    /// `details.error`, when the payload carries one
    pub fn error(&self) -> Option<ProofError> {
        match self {
            ProofDetails::Executed { .. } => None,
            ProofDetails::MissingHook { error, .. } | ProofDetails::ExecutionError { error, .. } => {
                Some(*error)
            }
        }
    }
}

/// One immutable verification event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofRecord {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub agent: String,
    pub target_rig: String,
    pub role: Role,
    pub action: String,
    pub status: ProofStatus,
    pub details: ProofDetails,
}

impl ProofRecord {
    /// Assemble a proof stamped with the current UTC time. Performs no I/O.
    pub fn build(
        target: &Path,
        role: Role,
        action: impl Into<String>,
        status: ProofStatus,
        details: ProofDetails,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            agent: role.agent_name(),
            target_rig: rig_name(target),
            role,
            action: action.into(),
            status,
            details,
        }
    }

    /// Single ledger line, without the trailing newline
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Final component of the target's absolute path.
///
/// Two Rigs with the same directory name share a `target_rig`. The
/// filesystem root has no final component and yields an empty name.
pub fn rig_name(target: &Path) -> String {
    absolutize(target)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Lexical absolute path: joined onto the current directory, `.` and `..`
/// folded, symlinks left alone.
fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("/"))
            .join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}
