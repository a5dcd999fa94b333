//! Truth ledger
//!
//! One append-only JSONL stream per role under a single root directory:
//! `{root}/{role}_log.jsonl`. Records are only ever appended; nothing here
//! reads, rewrites or truncates an existing file.

use super::proof::ProofRecord;
use super::roles::Role;
use crate::{OpenTruthError, Result};
use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Handle on a resolved ledger root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    root: PathBuf,
}

impl Ledger {
    /// The directory is created lazily on first append
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Per-role stream path
    pub fn log_path(&self, role: Role) -> PathBuf {
        self.root.join(format!("{}_log.jsonl", role.as_str()))
    }

    /// Append one record as a single line and return the file written.
    ///
    /// The line is assembled in memory and handed to one `write_all` on an
    /// O_APPEND descriptor so concurrent writers never interleave within a
    /// line.
    pub fn append(&self, record: &ProofRecord) -> Result<PathBuf> {
        let path = self.log_path(record.role);

        create_dir_all(&self.root).map_err(|source| {
            error!("Cannot create ledger directory {:?}: {}", self.root, source);
            OpenTruthError::Ledger {
                path: self.root.clone(),
                source,
            }
        })?;

        let mut line = record.to_line()?;
        line.push('\n');

        let ledger_error = |source: std::io::Error| {
            error!("Cannot append to ledger file {:?}: {}", path, source);
            OpenTruthError::Ledger {
                path: path.clone(),
                source,
            }
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(ledger_error)?;
        file.write_all(line.as_bytes()).map_err(ledger_error)?;
        file.flush().map_err(ledger_error)?;

        debug!("Appended {} byte proof to {:?}", line.len(), path);
        Ok(path)
    }
}
