// ABOUTME: Runs one deployment end to end and produces its report.
// ABOUTME: Sequences inspect, stop, replace, start and verify, short-circuiting on the first failure.

use chrono::Utc;
use std::time::Instant;

use crate::artifact::ArtifactDeployer;
use crate::diagnostics::Diagnostics;
use crate::host::{FileSystem, ProcessRunner};
use crate::inspect::HostInspector;
use crate::process::{ProcessController, ServerProcessState, StopError};
use crate::verify::DeploymentVerifier;

use super::Deployment;
use super::error::StageError;
use super::outcome::{DeploymentOutcome, DeploymentReport};
use super::plan::DeploymentPlan;
use super::state::Completed;

/// A failed run: the stage error plus whatever was observed on the way.
struct Failure {
    diagnostics: Diagnostics,
    error: StageError,
}

impl<S> From<(Deployment<'_, S>, StageError)> for Failure {
    fn from((deployment, error): (Deployment<'_, S>, StageError)) -> Self {
        Failure {
            diagnostics: deployment.into_diagnostics(),
            error,
        }
    }
}

/// Process states observed during the run.
#[derive(Default)]
struct Observed {
    initial: Option<ServerProcessState>,
    last: Option<ServerProcessState>,
}

/// Drives a [`DeploymentPlan`] against a host.
///
/// Concurrent runs against the same installation are not supported; callers
/// serialise them with a deploy lock.
pub struct Orchestrator<'a, F: FileSystem, R: ProcessRunner> {
    fs: &'a F,
    runner: &'a R,
    plan: &'a DeploymentPlan,
}

impl<'a, F: FileSystem, R: ProcessRunner> Orchestrator<'a, F, R> {
    pub fn new(fs: &'a F, runner: &'a R, plan: &'a DeploymentPlan) -> Self {
        Self { fs, runner, plan }
    }

    /// Run the deployment. Never fails: every failure becomes a report.
    pub async fn run(&self) -> DeploymentReport {
        let started_at = Utc::now();
        let timer = Instant::now();
        let mut observed = Observed::default();

        tracing::info!(
            "deploying {} to {}",
            self.plan.artifact.label(),
            self.plan.installation.root.display()
        );

        let result = self.execute(&mut observed).await;

        let mut report = DeploymentReport {
            outcome: DeploymentOutcome::Success,
            artifact: self.plan.artifact.label(),
            deployed_path: None,
            initial_state: observed.initial,
            final_state: observed.last,
            verification: None,
            warnings: Vec::new(),
            error: None,
            log_tail: Vec::new(),
            started_at,
            duration_secs: 0.0,
        };

        match result {
            Ok(deployment) => {
                report.deployed_path = Some(deployment.state().deployed().to_path_buf());
                report.verification = Some(deployment.verification());
                report.warnings = deployment.finish().into_warnings();
                tracing::info!("deployment of {} succeeded", report.artifact);
            }
            Err(failure) => {
                report.outcome = failure.error.outcome();
                report.error = Some(failure.error.to_string());
                report.warnings = failure.diagnostics.into_warnings();
                report.log_tail = self.log_tail().await;
                tracing::error!("deployment failed ({}): {}", report.outcome, failure.error);
            }
        }

        report.duration_secs = timer.elapsed().as_secs_f64();
        report
    }

    async fn execute(&self, observed: &mut Observed) -> Result<Deployment<'a, Completed>, Failure> {
        let inspector = HostInspector::new(self.fs);
        let deployer = ArtifactDeployer::new(self.fs);
        let verifier = DeploymentVerifier::new(self.fs);

        let deployment = Deployment::new(self.plan).inspect(&inspector).await?;

        let mut controller =
            match ProcessController::observe(self.runner, &self.plan.installation).await {
                Ok(controller) => controller,
                Err(e) => {
                    let error = StageError::Stop {
                        source: StopError::ProcessTable(e),
                    };
                    return Err(Failure::from((deployment, error)));
                }
            };
        observed.initial = Some(controller.state());

        let result = self
            .lifecycle(deployment, &mut controller, &deployer, &verifier)
            .await;
        observed.last = Some(controller.state());
        result
    }

    async fn lifecycle(
        &self,
        deployment: Deployment<'a, super::state::Inspected>,
        controller: &mut ProcessController<'_, R>,
        deployer: &ArtifactDeployer<'_, F>,
        verifier: &DeploymentVerifier<'_, F>,
    ) -> Result<Deployment<'a, Completed>, Failure> {
        let deployment = deployment.stop(controller).await?;
        let deployment = deployment.replace(deployer).await?;
        let deployment = deployment.start(controller).await?;
        let deployment = deployment.verify(verifier, controller).await?;
        Ok(deployment)
    }

    /// Best-effort tail of the server log; an unreadable log yields nothing.
    async fn log_tail(&self) -> Vec<String> {
        let log_file = &self.plan.installation.log_file;
        match self
            .fs
            .read_tail(log_file, self.plan.log_tail_lines)
            .await
        {
            Ok(lines) => lines,
            Err(e) => {
                tracing::debug!("no server log at {}: {}", log_file.display(), e);
                Vec::new()
            }
        }
    }
}
