use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenTruthError {
    #[error("Unknown role '{role}' (expected one of: {expected})")]
    UnknownRole { role: String, expected: String },

    #[error("Target path not found: {}", .0.display())]
    TargetNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to write ledger file {}", path.display())]
    Ledger {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OpenTruthError {
    /// Errors caused by how the tool was invoked rather than by the Rig or the ledger.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            OpenTruthError::UnknownRole { .. }
                | OpenTruthError::TargetNotFound(_)
                | OpenTruthError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, OpenTruthError>;
