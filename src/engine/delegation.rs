//! Delegation orchestrator
//!
//! Drives one verification end to end:
//!
//! ```text
//! START -> ROLE_RESOLVED -> HOOK_RESOLVED -> EXECUTED   -> LOGGED -> DONE
//!                       \-> MISSING_HOOK  \-> EXEC_ERROR -/
//! ```
//!
//! Every path past role resolution ends with exactly one ledger append. A
//! failed append is the only error that escapes once a role has resolved.

use super::hooks::{HookResolver, ResolvedHook};
use super::ledger::Ledger;
use super::proof::{ProofDetails, ProofRecord, ProofStatus};
use super::roles::Role;
use super::sandbox::{HookOutput, HookRunner, ProcessRunner};
use crate::config::{Settings, DEFAULT_TRUTH_DIR};
use crate::{OpenTruthError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegationState {
    Start,
    RoleResolved,
    HookResolved,
    MissingHook,
    Executed,
    ExecError,
    Logged,
    Done,
}

impl fmt::Display for DelegationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DelegationState::Start => "START",
            DelegationState::RoleResolved => "ROLE_RESOLVED",
            DelegationState::HookResolved => "HOOK_RESOLVED",
            DelegationState::MissingHook => "MISSING_HOOK",
            DelegationState::Executed => "EXECUTED",
            DelegationState::ExecError => "EXEC_ERROR",
            DelegationState::Logged => "LOGGED",
            DelegationState::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Result of one delegation, after its proof has been recorded
#[derive(Debug, Clone)]
pub struct Verdict {
    pub record: ProofRecord,
    /// Ledger file the proof was appended to
    pub ledger_file: PathBuf,
    /// Captured hook output, when the hook ran to completion
    pub output: Option<HookOutput>,
}

impl Verdict {
    pub fn role(&self) -> Role {
        self.record.role
    }

    pub fn status(&self) -> ProofStatus {
        self.record.status
    }

    /// True only when the hook ran and exited 0
    pub fn passed(&self) -> bool {
        self.record.status == ProofStatus::Success
    }
}

/// Composes role lookup, hook discovery, execution and ledger persistence
#[derive(Debug, Clone)]
pub struct Delegator<R = ProcessRunner> {
    runner: R,
    resolver: HookResolver,
    ledger: Ledger,
    truth_dir: String,
}

impl Delegator<ProcessRunner> {
    /// Production delegator for resolved settings
    pub fn from_settings(settings: &Settings) -> Self {
        Delegator::new(
            ProcessRunner::new(settings.hook_timeout),
            Ledger::new(&settings.ledger.root),
        )
        .with_truth_dir(settings.truth_dir.clone())
    }
}

impl<R: HookRunner> Delegator<R> {
    pub fn new(runner: R, ledger: Ledger) -> Self {
        Self {
            runner,
            resolver: HookResolver::new(),
            ledger,
            truth_dir: DEFAULT_TRUTH_DIR.to_string(),
        }
    }

    pub fn with_truth_dir(mut self, truth_dir: impl Into<String>) -> Self {
        self.truth_dir = truth_dir.into();
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn truth_dir(&self) -> &str {
        &self.truth_dir
    }

    /// Hook that would run for `role` against `target`, without running it
    pub fn locate_hook(&self, target: &Path, role: Role) -> Option<ResolvedHook> {
        self.resolver
            .find(&target.join(&self.truth_dir), role.check_name())
    }

    /// Verify `target` in the given role and record the proof.
    ///
    /// Usage errors (missing target, unknown role) return before anything is
    /// written. Hook failures and execution errors are recorded and returned
    /// as a non-passing [`Verdict`].
    pub async fn delegate(&self, target: &Path, role: &str) -> Result<Verdict> {
        debug!(state = %DelegationState::Start, "Delegating {:?} as '{}'", target, role);

        if !target.exists() {
            return Err(OpenTruthError::TargetNotFound(target.to_path_buf()));
        }
        let root = std::fs::canonicalize(target)?;

        let role = Role::resolve(role)?;
        let check = role.check_name();
        debug!(state = %DelegationState::RoleResolved, "Role '{}' requires '{}'", role, check);

        let truth_dir = root.join(&self.truth_dir);
        let hook = match self.resolver.find(&truth_dir, check) {
            Some(hook) => hook,
            None => {
                warn!(
                    state = %DelegationState::MissingHook,
                    "{:?} has no '{}' hook in {}", root, check, self.truth_dir
                );
                let details = ProofDetails::missing_hook(
                    check,
                    &self.truth_dir,
                    self.resolver.candidates(check),
                );
                return self.record(target, role, ProofStatus::Failure, details, None);
            }
        };
        debug!(state = %DelegationState::HookResolved, "Running {:?}", hook.path);

        match self.runner.run(&hook.path, &root).await {
            Ok(output) => {
                let status = if output.passed() {
                    ProofStatus::Success
                } else {
                    ProofStatus::Failure
                };
                debug!(
                    state = %DelegationState::Executed,
                    "Hook {} exited with {}", hook.file_name, output.exit_code
                );
                let details = ProofDetails::executed(&hook, &output);
                self.record(target, role, status, details, Some(output))
            }
            Err(e) => {
                warn!(state = %DelegationState::ExecError, "Hook {} did not complete: {}", hook.file_name, e);
                let details = ProofDetails::execution_error(&hook, &e);
                self.record(target, role, ProofStatus::Error, details, None)
            }
        }
    }

    fn record(
        &self,
        target: &Path,
        role: Role,
        status: ProofStatus,
        details: ProofDetails,
        output: Option<HookOutput>,
    ) -> Result<Verdict> {
        let record = ProofRecord::build(target, role, role.action(), status, details);
        let ledger_file = self.ledger.append(&record)?;
        debug!(state = %DelegationState::Logged, "Proof appended to {:?}", ledger_file);

        info!(
            state = %DelegationState::Done,
            "{} verification of '{}': {}", role.display_name(), record.target_rig, status
        );
        Ok(Verdict {
            record,
            ledger_file,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::proof::ProofError;
    use crate::engine::sandbox::SandboxError;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Records invocations and replays a canned outcome
    struct ScriptedRunner {
        outcome: fn() -> std::result::Result<HookOutput, SandboxError>,
        calls: RefCell<Vec<(PathBuf, PathBuf)>>,
    }

    impl ScriptedRunner {
        fn new(outcome: fn() -> std::result::Result<HookOutput, SandboxError>) -> Self {
            Self {
                outcome,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl HookRunner for ScriptedRunner {
        async fn run(
            &self,
            hook: &Path,
            working_dir: &Path,
        ) -> std::result::Result<HookOutput, SandboxError> {
            self.calls
                .borrow_mut()
                .push((hook.to_path_buf(), working_dir.to_path_buf()));
            (self.outcome)()
        }
    }

    /// A Rig with `.truth/<file>` present (content irrelevant to the scripted runner)
    fn rig_with_hook(file: &str) -> TempDir {
        let rig = TempDir::new().unwrap();
        let truth = rig.path().join(".truth");
        fs::create_dir_all(&truth).unwrap();
        let path = truth.join(file);
        fs::write(&path, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&path, perms).unwrap();
        }
        rig
    }

    fn read_records(path: &Path) -> Vec<ProofRecord> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_from_settings_carries_resolved_values() {
        let settings = Settings {
            ledger: crate::io::paths::LedgerLocation {
                root: PathBuf::from("/srv/truth_ledger"),
                source: crate::io::paths::LedgerSource::CliFlag,
            },
            hook_timeout: Some(std::time::Duration::from_secs(45)),
            truth_dir: ".checks".to_string(),
        };

        let delegator = Delegator::from_settings(&settings);

        assert_eq!(delegator.ledger().root(), Path::new("/srv/truth_ledger"));
        assert_eq!(
            delegator.runner().timeout(),
            Some(std::time::Duration::from_secs(45))
        );
        assert_eq!(delegator.truth_dir(), ".checks");
    }

    #[tokio::test]
    async fn test_passing_hook_logs_success() {
        let rig = rig_with_hook("verify_logic.sh");
        let ledger_dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new(|| Ok(HookOutput::new(0, "12 passed\n", "")));
        let delegator = Delegator::new(runner, Ledger::new(ledger_dir.path()));

        let verdict = delegator.delegate(rig.path(), "gauger").await.unwrap();

        assert!(verdict.passed());
        assert_eq!(verdict.output.as_ref().unwrap().stdout, "12 passed");
        assert_eq!(verdict.ledger_file, ledger_dir.path().join("gauger_log.jsonl"));

        let calls = delegator.runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        let root = fs::canonicalize(rig.path()).unwrap();
        assert_eq!(calls[0].0, root.join(".truth/verify_logic.sh"));
        assert_eq!(calls[0].1, root);

        let records = read_records(&verdict.ledger_file);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, ProofStatus::Success);
        assert_eq!(records[0].action, "delegate_gauger");
    }

    #[tokio::test]
    async fn test_nonzero_exit_logs_failure() {
        let rig = rig_with_hook("verify_logic");
        let ledger_dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new(|| Ok(HookOutput::new(3, "", "2 failed")));
        let delegator = Delegator::new(runner, Ledger::new(ledger_dir.path()));

        let verdict = delegator.delegate(rig.path(), "gauger").await.unwrap();

        assert!(!verdict.passed());
        assert_eq!(verdict.status(), ProofStatus::Failure);
        match &verdict.record.details {
            ProofDetails::Executed {
                exit_code, stderr, ..
            } => {
                assert_eq!(*exit_code, 3);
                assert_eq!(stderr, "2 failed");
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_hook_never_runs_anything() {
        let rig = rig_with_hook("verify_logic.sh");
        let ledger_dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new(|| panic!("runner must not be called"));
        let delegator = Delegator::new(runner, Ledger::new(ledger_dir.path()));

        let verdict = delegator.delegate(rig.path(), "spotter").await.unwrap();

        assert!(!verdict.passed());
        assert_eq!(verdict.status(), ProofStatus::Failure);
        assert_eq!(verdict.record.details.error(), Some(ProofError::MissingHook));
        assert!(verdict.output.is_none());
        assert!(delegator.runner.calls.borrow().is_empty());
        assert_eq!(read_records(&ledger_dir.path().join("spotter_log.jsonl")).len(), 1);
    }

    #[tokio::test]
    async fn test_execution_error_logs_error_status() {
        let rig = rig_with_hook("verify_visual.py");
        let ledger_dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new(|| {
            Err(SandboxError::Spawn(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "exec format error",
            )))
        });
        let delegator = Delegator::new(runner, Ledger::new(ledger_dir.path()));

        let verdict = delegator.delegate(rig.path(), "spotter").await.unwrap();

        assert_eq!(verdict.status(), ProofStatus::Error);
        assert!(!verdict.passed());
        assert_eq!(verdict.record.details.error(), Some(ProofError::SpawnFailed));
    }

    #[tokio::test]
    async fn test_unknown_role_writes_nothing() {
        let rig = rig_with_hook("verify_logic.sh");
        let ledger_dir = TempDir::new().unwrap();
        let ledger_root = ledger_dir.path().join("ledger");
        let runner = ScriptedRunner::new(|| panic!("runner must not be called"));
        let delegator = Delegator::new(runner, Ledger::new(&ledger_root));

        let err = delegator.delegate(rig.path(), "witness").await.unwrap_err();

        assert!(matches!(err, OpenTruthError::UnknownRole { .. }));
        assert!(!ledger_root.exists());
    }

    #[tokio::test]
    async fn test_missing_target_writes_nothing() {
        let ledger_dir = TempDir::new().unwrap();
        let ledger_root = ledger_dir.path().join("ledger");
        let runner = ScriptedRunner::new(|| panic!("runner must not be called"));
        let delegator = Delegator::new(runner, Ledger::new(&ledger_root));

        // Checked before the role, so even a bogus role reports the target
        let err = delegator
            .delegate(&ledger_dir.path().join("no_such_rig"), "witness")
            .await
            .unwrap_err();

        assert!(matches!(err, OpenTruthError::TargetNotFound(_)));
        assert!(!ledger_root.exists());
    }

    #[tokio::test]
    async fn test_custom_truth_dir() {
        let rig = TempDir::new().unwrap();
        let hooks = rig.path().join("meta").join("checks");
        fs::create_dir_all(&hooks).unwrap();
        fs::write(hooks.join("verify_logic.rb"), "").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(
                hooks.join("verify_logic.rb"),
                fs::Permissions::from_mode(0o755),
            )
            .unwrap();
        }
        let ledger_dir = TempDir::new().unwrap();
        let delegator = Delegator::new(
            ScriptedRunner::new(|| Ok(HookOutput::new(0, "", ""))),
            Ledger::new(ledger_dir.path()),
        )
        .with_truth_dir("meta/checks");

        let located = delegator.locate_hook(rig.path(), Role::Gauger).unwrap();
        assert_eq!(located.file_name, "verify_logic.rb");

        let verdict = delegator.delegate(rig.path(), "gauger").await.unwrap();
        assert!(verdict.passed());
    }

    #[test]
    fn test_state_names() {
        assert_eq!(DelegationState::MissingHook.to_string(), "MISSING_HOOK");
        assert_eq!(DelegationState::ExecError.to_string(), "EXEC_ERROR");
    }
}
