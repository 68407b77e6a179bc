// ABOUTME: State transition methods for deployment orchestration.
// ABOUTME: Each method consumes self and returns the next state, or itself with the stage error.

use snafu::ResultExt;

use crate::artifact::ArtifactDeployer;
use crate::config::LingeringPolicy;
use crate::diagnostics::{Diagnostics, Warning};
use crate::host::{FileSystem, ProcessRunner};
use crate::inspect::HostInspector;
use crate::process::ProcessController;
use crate::verify::{DeploymentVerifier, VerificationOutcome};

use super::Deployment;
use super::error::{
    DeploySnafu, LingeringSnafu, NotServingSnafu, PrecheckSnafu, StageError, StartSnafu,
    StopSnafu, VerifySnafu,
};
use super::state::{Completed, Initialized, Inspected, Replaced, Started, Stopped};

/// Result type for transitions; on failure the deployment is handed back.
pub type TransitionResult<'a, T, S> =
    Result<Deployment<'a, T>, (Deployment<'a, S>, StageError)>;

// =============================================================================
// Internal Helpers
// =============================================================================

impl<'a, S> Deployment<'a, S> {
    /// Internal helper to move into the next state.
    fn transition<T>(self, state: T) -> Deployment<'a, T> {
        Deployment {
            plan: self.plan,
            diagnostics: self.diagnostics,
            state,
        }
    }

    fn fail<T>(self, error: StageError) -> TransitionResult<'a, T, S> {
        Err((self, error))
    }
}

// =============================================================================
// Initialized -> Inspected
// =============================================================================

impl<'a> Deployment<'a, Initialized> {
    /// Check the installation before anything destructive happens.
    ///
    /// # Errors
    ///
    /// Any precheck failure; nothing on the host has been changed except,
    /// possibly, script permissions.
    pub async fn inspect<F: FileSystem>(
        mut self,
        inspector: &HostInspector<'_, F>,
    ) -> TransitionResult<'a, Inspected, Initialized> {
        let report = match inspector
            .check(&self.plan.installation)
            .await
            .context(PrecheckSnafu)
        {
            Ok(report) => report,
            Err(e) => return self.fail(e),
        };

        for script in &report.repaired {
            self.diagnostics.warn(Warning::permission_repaired(format!(
                "{} was not executable; execute permission granted",
                script.display()
            )));
        }

        Ok(self.transition(Inspected { report }))
    }
}

// =============================================================================
// Inspected -> Stopped
// =============================================================================

impl<'a> Deployment<'a, Inspected> {
    /// Stop the running server, applying the lingering-process policy.
    ///
    /// # Errors
    ///
    /// Returns `StageError::Lingering` when the server survives a forced stop
    /// and the policy is `fail`.
    pub async fn stop<R: ProcessRunner>(
        mut self,
        controller: &mut ProcessController<'_, R>,
    ) -> TransitionResult<'a, Stopped, Inspected> {
        let outcome = match controller
            .stop(self.plan.stop, self.plan.kill_wait)
            .await
            .context(StopSnafu)
        {
            Ok(outcome) => outcome,
            Err(e) => return self.fail(e),
        };

        if let Some(pids) = outcome.survivors() {
            match self.plan.on_lingering {
                LingeringPolicy::Fail => {
                    let err = LingeringSnafu { pids: pids.to_vec() }.build();
                    return self.fail(err);
                }
                LingeringPolicy::Warn => {
                    self.diagnostics.warn(Warning::lingering_process(format!(
                        "server still running after forced stop (pids {:?}); deploying anyway",
                        pids
                    )));
                }
            }
        }

        Ok(self.transition(Stopped { outcome }))
    }
}

// =============================================================================
// Stopped -> Replaced
// =============================================================================

impl<'a> Deployment<'a, Stopped> {
    /// Swap the deployed artifact.
    ///
    /// # Errors
    ///
    /// `ArtifactMissing`-class errors leave the deploy directory untouched;
    /// the server stays stopped either way.
    pub async fn replace<F: FileSystem>(
        self,
        deployer: &ArtifactDeployer<'_, F>,
    ) -> TransitionResult<'a, Replaced, Stopped> {
        match deployer
            .replace(&self.plan.installation.deploy_dir, &self.plan.artifact)
            .await
            .context(DeploySnafu)
        {
            Ok(deployed) => Ok(self.transition(Replaced { deployed })),
            Err(e) => self.fail(e),
        }
    }
}

// =============================================================================
// Replaced -> Started
// =============================================================================

impl<'a> Deployment<'a, Replaced> {
    /// Start the server with the new content in place.
    ///
    /// # Errors
    ///
    /// Returns the start error if no server process appears.
    pub async fn start<R: ProcessRunner>(
        self,
        controller: &mut ProcessController<'_, R>,
    ) -> TransitionResult<'a, Started, Replaced> {
        if let Err(e) = controller.start(self.plan.start).await.context(StartSnafu) {
            return self.fail(e);
        }

        let deployed = self.state.deployed.clone();
        Ok(self.transition(Started { deployed }))
    }
}

// =============================================================================
// Started -> Completed
// =============================================================================

impl<'a> Deployment<'a, Started> {
    /// Confirm the new content is being served.
    ///
    /// A pending verification becomes a warning; only a stopped server fails.
    ///
    /// # Errors
    ///
    /// `NotServing` if the content never appeared and the server is gone.
    pub async fn verify<F: FileSystem, R: ProcessRunner>(
        mut self,
        verifier: &DeploymentVerifier<'_, F>,
        controller: &mut ProcessController<'_, R>,
    ) -> TransitionResult<'a, Completed, Started> {
        let plan = self.plan;
        let verification = match verifier
            .confirm(
                controller,
                &plan.installation.deploy_dir,
                &plan.artifact,
                plan.verify,
            )
            .await
            .context(VerifySnafu)
        {
            Ok(v) => v,
            Err(e) => return self.fail(e),
        };

        let exploded = plan.artifact.exploded_path(&plan.installation.deploy_dir);
        if verification.is_fatal() {
            return self.fail(NotServingSnafu { exploded }.build());
        }
        if verification == VerificationOutcome::Pending {
            self.diagnostics.warn(Warning::verification_pending(format!(
                "server is running but {} has not appeared yet",
                exploded.display()
            )));
        }

        let deployed = self.state.deployed.clone();
        Ok(self.transition(Completed {
            deployed,
            verification,
        }))
    }
}

// =============================================================================
// Completed - Terminal State
// =============================================================================

impl<'a> Deployment<'a, Completed> {
    pub fn verification(&self) -> VerificationOutcome {
        self.state.verification
    }

    /// Consume the deployment, returning its warnings.
    pub fn finish(self) -> Diagnostics {
        self.diagnostics
    }
}
