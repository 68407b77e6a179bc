// ABOUTME: Process capability trait and its tokio-backed host implementation.
// ABOUTME: Runs server scripts, scans the process table with pgrep and signals with kill.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::types::ProcessMatcher;

/// Signals the controller may send to the server process. The stop script
/// is the graceful path, so only the forced stop signals directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Kill,
}

impl Signal {
    /// Name as accepted by `kill -<NAME>`.
    pub fn name(&self) -> &'static str {
        match self {
            Signal::Kill => "KILL",
        }
    }
}

/// A server script together with the environment it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptInvocation {
    pub program: PathBuf,
    pub working_dir: PathBuf,
    pub env: HashMap<String, String>,
}

/// Captured result of a script that ran to completion.
#[derive(Debug, Clone, Default)]
pub struct ScriptOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ScriptOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Errors from process operations.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to execute {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("{} did not exit within {} seconds", program.display(), timeout.as_secs())]
    Timeout { program: PathBuf, timeout: Duration },

    #[error("process scan failed: {0}")]
    Scan(String),

    #[error("failed to signal pid {pid}: {message}")]
    Signal { pid: u32, message: String },
}

/// Process-table and script operations.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run a script to completion, killing it if it outlives `timeout`.
    async fn run_script(
        &self,
        invocation: &ScriptInvocation,
        timeout: Duration,
    ) -> Result<ScriptOutput, ProcessError>;

    /// Start a script without waiting for it to finish.
    async fn launch(&self, invocation: &ScriptInvocation) -> Result<(), ProcessError>;

    /// Pids whose full command line matches `matcher`.
    async fn find_processes(&self, matcher: &ProcessMatcher) -> Result<Vec<u32>, ProcessError>;

    async fn signal(&self, pid: u32, signal: Signal) -> Result<(), ProcessError>;
}

/// `ProcessRunner` for the local host.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostProcessRunner;

impl HostProcessRunner {
    fn command(invocation: &ScriptInvocation) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.current_dir(&invocation.working_dir)
            .envs(&invocation.env)
            .stdin(Stdio::null());
        cmd
    }
}

#[async_trait]
impl ProcessRunner for HostProcessRunner {
    async fn run_script(
        &self,
        invocation: &ScriptInvocation,
        timeout: Duration,
    ) -> Result<ScriptOutput, ProcessError> {
        let mut cmd = Self::command(invocation);
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| ProcessError::Spawn {
                program: invocation.program.clone(),
                source,
            })?,
            Err(_elapsed) => {
                return Err(ProcessError::Timeout {
                    program: invocation.program.clone(),
                    timeout,
                });
            }
        };

        Ok(ScriptOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    async fn launch(&self, invocation: &ScriptInvocation) -> Result<(), ProcessError> {
        let mut cmd = Self::command(invocation);
        cmd.stdout(Stdio::null()).stderr(Stdio::null());

        let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        // Reap the launcher in the background; the server it starts daemonizes.
        let program = invocation.program.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => {
                    tracing::debug!("{} exited with {}", program.display(), status)
                }
                Err(e) => tracing::debug!("failed to wait for {}: {}", program.display(), e),
            }
        });

        Ok(())
    }

    async fn find_processes(&self, matcher: &ProcessMatcher) -> Result<Vec<u32>, ProcessError> {
        let output = Command::new("pgrep")
            .arg("-f")
            .arg(matcher.as_str())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ProcessError::Scan(format!("failed to run pgrep: {}", e)))?;

        match output.status.code() {
            Some(0) => Ok(parse_pids(&String::from_utf8_lossy(&output.stdout))),
            Some(1) => Ok(Vec::new()),
            code => Err(ProcessError::Scan(format!(
                "pgrep exited with {:?}: {}",
                code,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }

    async fn signal(&self, pid: u32, signal: Signal) -> Result<(), ProcessError> {
        let output = Command::new("kill")
            .arg(format!("-{}", signal.name()))
            .arg(pid.to_string())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ProcessError::Signal {
                pid,
                message: e.to_string(),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ProcessError::Signal {
                pid,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Parse pgrep output, skipping our own pid (our command line may contain the pattern).
fn parse_pids(stdout: &str) -> Vec<u32> {
    let own = std::process::id();
    stdout
        .lines()
        .filter_map(|line| line.trim().parse::<u32>().ok())
        .filter(|pid| *pid != own)
        .collect()
}
