// ABOUTME: Stage errors for the deployment state machine, using the SNAFU pattern.
// ABOUTME: Wraps each component's error and maps it to the run's terminal outcome.

use snafu::Snafu;
use std::path::PathBuf;

use crate::artifact::DeployError;
use crate::host::ProcessError;
use crate::inspect::PrecheckError;
use crate::process::{StartError, StopError};

use super::outcome::DeploymentOutcome;

/// The first fatal failure of a run.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StageError {
    #[snafu(display("precheck failed: {source}"))]
    Precheck { source: PrecheckError },

    #[snafu(display("stop failed: {source}"))]
    Stop { source: StopError },

    #[snafu(display("server still running after forced stop (pids {pids:?})"))]
    Lingering { pids: Vec<u32> },

    #[snafu(display("artifact replacement failed: {source}"))]
    Deploy { source: DeployError },

    #[snafu(display("start failed: {source}"))]
    Start { source: StartError },

    #[snafu(display("server stopped before {} appeared", exploded.display()))]
    NotServing { exploded: PathBuf },

    #[snafu(display("verification failed: {source}"))]
    Verify { source: ProcessError },
}

impl StageError {
    /// The terminal outcome this failure maps to.
    pub fn outcome(&self) -> DeploymentOutcome {
        match self {
            StageError::Precheck { .. } => DeploymentOutcome::PrecheckFailed,
            StageError::Stop { .. } | StageError::Lingering { .. } => {
                DeploymentOutcome::StopFailed
            }
            StageError::Deploy { source } if source.is_source_missing() => {
                DeploymentOutcome::ArtifactMissing
            }
            StageError::Deploy { .. } => DeploymentOutcome::DeployFailed,
            StageError::Start { .. } => DeploymentOutcome::StartFailed,
            StageError::NotServing { .. } | StageError::Verify { .. } => {
                DeploymentOutcome::VerificationFailed
            }
        }
    }
}
