//! Role registry
//!
//! Maps each inspection role to the logical check a Rig must expose for it.
//! The set is closed; anything outside it is rejected before the filesystem
//! or the ledger is touched.

use crate::{OpenTruthError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inspection roles understood by the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Logic verification (unit tests, scripts, code integrity)
    Gauger,
    /// Perception verification (visual assets, screenshots, builds)
    Spotter,
}

impl Role {
    /// Every role, in a fixed order
    pub fn all() -> &'static [Role] {
        &[Role::Gauger, Role::Spotter]
    }

    /// Look up a role by its identifier
    pub fn resolve(name: &str) -> Result<Role> {
        name.parse()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Gauger => "gauger",
            Role::Spotter => "spotter",
        }
    }

    /// Logical check name the Rig's hook must carry for this role
    pub fn check_name(&self) -> &'static str {
        match self {
            Role::Gauger => "verify_logic",
            Role::Spotter => "verify_visual",
        }
    }

    /// Role identifier with its first letter upper-cased, e.g. `Gauger`
    pub fn display_name(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Agent name stamped on every proof, e.g. `OpenTruth-Gauger`
    pub fn agent_name(&self) -> String {
        format!("OpenTruth-{}", self.display_name())
    }

    /// Action tag stamped on every proof, e.g. `delegate_gauger`
    pub fn action(&self) -> String {
        format!("delegate_{}", self.as_str())
    }

    fn expected() -> String {
        Role::all()
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = OpenTruthError;

    fn from_str(s: &str) -> Result<Self> {
        Role::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| OpenTruthError::UnknownRole {
                role: s.to_string(),
                expected: Role::expected(),
            })
    }
}
