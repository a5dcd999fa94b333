//! Verification delegation engine
//!
//! Role lookup, hook discovery, sandboxed execution, proof construction and
//! ledger persistence, composed by [`delegation::Delegator`].

pub mod delegation;
pub mod hooks;
pub mod ledger;
pub mod proof;
pub mod roles;
pub mod sandbox;

pub use delegation::{DelegationState, Delegator, Verdict};
pub use hooks::{HookResolver, ResolvedHook, HOOK_SUFFIXES};
pub use ledger::Ledger;
pub use proof::{ProofDetails, ProofError, ProofRecord, ProofStatus};
pub use roles::Role;
pub use sandbox::{HookOutput, HookRunner, ProcessRunner, SandboxError};
