//! Hook execution
//!
//! The orchestrator only needs "an invokable artifact that yields an exit
//! code and two output streams for a working directory". [`HookRunner`] is
//! that seam; [`ProcessRunner`] is the production implementation built on
//! `tokio::process`.
//!
//! Hooks get no arguments, a null stdin, the inherited environment, and the
//! Rig root as working directory. Both streams are captured in full and
//! trimmed.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Default wall-clock budget for a single hook
pub const DEFAULT_HOOK_TIMEOUT: Duration = Duration::from_secs(300);

/// Time a hook gets to exit after SIGTERM before it is killed
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// What a hook reported once it ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookOutput {
    /// Process exit code; `-1` when the process was ended by a signal
    pub exit_code: i32,
    /// Trimmed standard output
    pub stdout: String,
    /// Trimmed standard error
    pub stderr: String,
}

impl HookOutput {
    pub fn new(exit_code: i32, stdout: impl AsRef<str>, stderr: impl AsRef<str>) -> Self {
        Self {
            exit_code,
            stdout: stdout.as_ref().trim().to_string(),
            stderr: stderr.as_ref().trim().to_string(),
        }
    }

    pub fn passed(&self) -> bool {
        self.exit_code == 0
    }
}

/// The hook could not be run to completion
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("Failed to spawn hook: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Failed while waiting for hook output: {0}")]
    Wait(#[source] std::io::Error),

    #[error("Hook exceeded timeout of {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("Hook interrupted by {0}")]
    Interrupted(&'static str),
}

/// Anything that can execute a hook and report `(exit_code, stdout, stderr)`
#[allow(async_fn_in_trait)]
pub trait HookRunner {
    async fn run(&self, hook: &Path, working_dir: &Path) -> Result<HookOutput, SandboxError>;
}

/// Runs hooks as child processes
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
    grace_period: Duration,
}

impl ProcessRunner {
    /// `None` lets a hook run for as long as it likes
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// SIGTERM, wait out the grace period, then kill
    async fn terminate(&self, child: &mut Child) {
        #[cfg(unix)]
        if let Some(pid) = child.id().and_then(|pid| libc::pid_t::try_from(pid).ok()) {
            // SAFETY: plain kill(2) on a pid we spawned and have not yet reaped.
            let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
            if rc == 0 {
                if let Ok(Ok(status)) = tokio::time::timeout(self.grace_period, child.wait()).await
                {
                    debug!("Hook exited after SIGTERM: {}", status);
                    return;
                }
            }
        }

        if let Err(e) = child.kill().await {
            warn!("Failed to kill hook process: {}", e);
        }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(Some(DEFAULT_HOOK_TIMEOUT))
    }
}

impl HookRunner for ProcessRunner {
    async fn run(&self, hook: &Path, working_dir: &Path) -> Result<HookOutput, SandboxError> {
        debug!("Spawning hook {:?} in {:?}", hook, working_dir);

        let mut child = Command::new(hook)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(SandboxError::Spawn)?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let outcome = {
            let finished = async {
                tokio::try_join!(child.wait(), read_stream(stdout), read_stream(stderr))
            };

            tokio::select! {
                result = finished => result.map_err(SandboxError::Wait),
                _ = deadline(self.timeout) => {
                    Err(SandboxError::TimedOut(self.timeout.unwrap_or_default()))
                }
                signal = shutdown_signal() => Err(SandboxError::Interrupted(signal)),
            }
        };

        let (status, stdout, stderr) = match outcome {
            Ok(collected) => collected,
            Err(e @ (SandboxError::TimedOut(_) | SandboxError::Interrupted(_))) => {
                warn!("Terminating hook {:?}: {}", hook, e);
                self.terminate(&mut child).await;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                warn!("Hook {:?} was terminated by signal {}", hook, signal);
            }
        }

        let output = HookOutput::new(
            status.code().unwrap_or(-1),
            String::from_utf8_lossy(&stdout),
            String::from_utf8_lossy(&stderr),
        );
        debug!("Hook {:?} exited with {}", hook, output.exit_code);
        Ok(output)
    }
}

async fn read_stream<R: AsyncRead + Unpin>(stream: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

async fn deadline(timeout: Option<Duration>) {
    match timeout {
        Some(timeout) => tokio::time::sleep(timeout).await,
        None => std::future::pending().await,
    }
}

/// Resolves when the coordinator itself is asked to stop
#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        _ => {
            warn!("Could not install signal handlers; hooks will not be interruptible");
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    match tokio::signal::ctrl_c().await {
        Ok(()) => "ctrl-c",
        Err(_) => std::future::pending().await,
    }
}
