// ABOUTME: Process controller driving the server through stop and start.
// ABOUTME: Layers sleep-then-check waits with kill escalation around black-box scripts.

use std::time::Duration;

use crate::host::{ProcessError, ProcessRunner, ScriptInvocation, Signal};
use crate::poll::PollPolicy;
use crate::types::ServerInstallation;

use super::error::{StartError, StopError};
use super::state::{ServerProcessState, StopOutcome};

/// Floor for the stop script's own timeout so a zero grace period still lets it run.
const MIN_SCRIPT_TIMEOUT: Duration = Duration::from_secs(1);

/// Sole authority on the server's [`ServerProcessState`] during a run.
pub struct ProcessController<'a, R: ProcessRunner> {
    runner: &'a R,
    installation: &'a ServerInstallation,
    state: ServerProcessState,
}

impl<R: ProcessRunner> std::fmt::Debug for ProcessController<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessController")
            .field("root", &self.installation.root)
            .field("state", &self.state)
            .finish()
    }
}

impl<'a, R: ProcessRunner> ProcessController<'a, R> {
    /// Read the process table and record what is there now.
    pub async fn observe(
        runner: &'a R,
        installation: &'a ServerInstallation,
    ) -> Result<Self, ProcessError> {
        let pids = runner.find_processes(&installation.matcher).await?;
        let state = if pids.is_empty() {
            ServerProcessState::Stopped
        } else {
            ServerProcessState::Running
        };
        tracing::debug!("observed server {} (pids {:?})", state, pids);

        Ok(Self {
            runner,
            installation,
            state,
        })
    }

    pub fn state(&self) -> ServerProcessState {
        self.state
    }

    /// Whether any process matches the installation's pattern right now.
    ///
    /// The answer replaces the recorded state, so a server that died after
    /// `start` reads as `Stopped` afterwards.
    pub async fn is_running(&mut self) -> Result<bool, ProcessError> {
        let running = !self.scan().await?.is_empty();
        let state = if running {
            ServerProcessState::Running
        } else {
            ServerProcessState::Stopped
        };
        if state != self.state {
            tracing::debug!("server went from {} to {}", self.state, state);
            self.state = state;
        }
        Ok(running)
    }

    /// Stop the server.
    ///
    /// Runs the stop script (its exit status is only logged), polls with
    /// `grace`, then kills every survivor and scans exactly once more after
    /// `kill_wait`. Survivors are reported, not treated as an error.
    ///
    /// # Errors
    ///
    /// Returns `StopError::ProcessTable` if the process table cannot be read.
    pub async fn stop(
        &mut self,
        grace: PollPolicy,
        kill_wait: Duration,
    ) -> Result<StopOutcome, StopError> {
        let pids = self.scan().await.map_err(StopError::ProcessTable)?;
        if pids.is_empty() {
            tracing::info!("server is not running, nothing to stop");
            self.state = ServerProcessState::Stopped;
            return Ok(StopOutcome::AlreadyStopped);
        }

        self.state = ServerProcessState::Stopping;
        tracing::info!("stopping server (pids {:?})", pids);
        self.run_stop_script(grace.budget().max(MIN_SCRIPT_TIMEOUT))
            .await;

        let mut remaining = pids;
        for delay in grace.delays() {
            tokio::time::sleep(delay).await;
            remaining = self.scan().await.map_err(StopError::ProcessTable)?;
            if remaining.is_empty() {
                self.state = ServerProcessState::Stopped;
                return Ok(StopOutcome::Graceful);
            }
        }

        tracing::warn!(
            "server still running after graceful stop, killing pids {:?}",
            remaining
        );
        for pid in &remaining {
            if let Err(e) = self.runner.signal(*pid, Signal::Kill).await {
                // The process may have exited between the scan and the kill.
                tracing::warn!("{}", e);
            }
        }

        tokio::time::sleep(kill_wait).await;
        let survivors = self.scan().await.map_err(StopError::ProcessTable)?;
        if survivors.is_empty() {
            self.state = ServerProcessState::Stopped;
            Ok(StopOutcome::Forced)
        } else {
            tracing::error!("server survived forced stop (pids {:?})", survivors);
            self.state = ServerProcessState::Running;
            Ok(StopOutcome::Lingering(survivors))
        }
    }

    /// Start the server and wait for a matching process to appear.
    ///
    /// # Errors
    ///
    /// Returns `StartError::NotRunning` if nothing matches once `settle` is
    /// exhausted, or `StartError::Launch` if the script could not be spawned.
    pub async fn start(&mut self, settle: PollPolicy) -> Result<(), StartError> {
        let invocation = self.invocation(&self.installation.start_script);
        tracing::info!("running {}", invocation.program.display());

        if let Err(e) = self.runner.launch(&invocation).await {
            self.state = ServerProcessState::StartFailed;
            return Err(StartError::Launch(e));
        }

        for delay in settle.delays() {
            tokio::time::sleep(delay).await;
            let pids = self.scan().await.map_err(StartError::ProcessTable)?;
            if !pids.is_empty() {
                tracing::info!("server running (pids {:?})", pids);
                self.state = ServerProcessState::Running;
                return Ok(());
            }
        }

        self.state = ServerProcessState::StartFailed;
        Err(StartError::NotRunning {
            waited: settle.budget(),
        })
    }

    async fn run_stop_script(&self, timeout: Duration) {
        let invocation = self.invocation(&self.installation.stop_script);
        tracing::info!("running {}", invocation.program.display());

        match self.runner.run_script(&invocation, timeout).await {
            Ok(output) if output.success() => {
                tracing::debug!("stop script exited cleanly");
            }
            Ok(output) => {
                tracing::warn!(
                    "stop script exited with {:?}: {}",
                    output.exit_code,
                    output.stderr.trim()
                );
            }
            Err(e) => tracing::warn!("stop script failed: {}", e),
        }
    }

    async fn scan(&self) -> Result<Vec<u32>, ProcessError> {
        self.runner
            .find_processes(&self.installation.matcher)
            .await
    }

    fn invocation(&self, script: &std::path::Path) -> ScriptInvocation {
        ScriptInvocation {
            program: script.to_path_buf(),
            working_dir: self.installation.root.clone(),
            env: self.installation.env.clone(),
        }
    }
}
