// ABOUTME: Post-start confirmation that the new artifact is being served.
// ABOUTME: Looks for the exploded deployment directory the server creates asynchronously.

use serde::Serialize;
use std::path::Path;

use crate::host::{FileSystem, ProcessError, ProcessRunner};
use crate::poll::PollPolicy;
use crate::process::ProcessController;
use crate::types::DeploymentArtifact;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// The exploded directory exists.
    Confirmed,
    /// Not extracted yet, but the server is up.
    Pending,
    /// Not extracted and the server is gone.
    NotRunning,
}

impl VerificationOutcome {
    pub fn is_fatal(&self) -> bool {
        matches!(self, VerificationOutcome::NotRunning)
    }
}

pub struct DeploymentVerifier<'a, F: FileSystem> {
    fs: &'a F,
}

impl<'a, F: FileSystem> DeploymentVerifier<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    /// Poll for the exploded directory, then classify.
    ///
    /// The process controller decides whether the server is running.
    pub async fn confirm<R: ProcessRunner>(
        &self,
        controller: &mut ProcessController<'_, R>,
        deploy_dir: &Path,
        artifact: &DeploymentArtifact,
        policy: PollPolicy,
    ) -> Result<VerificationOutcome, ProcessError> {
        let exploded = artifact.exploded_path(deploy_dir);

        for delay in policy.delays() {
            tokio::time::sleep(delay).await;
            if self.is_extracted(&exploded).await {
                tracing::info!("{} is deployed", exploded.display());
                return Ok(VerificationOutcome::Confirmed);
            }
        }

        if controller.is_running().await? {
            tracing::warn!(
                "{} has not appeared yet but the server is running",
                exploded.display()
            );
            Ok(VerificationOutcome::Pending)
        } else {
            Ok(VerificationOutcome::NotRunning)
        }
    }

    async fn is_extracted(&self, path: &Path) -> bool {
        match self.fs.metadata(path).await {
            Ok(info) => info.is_some_and(|i| i.is_dir()),
            Err(e) => {
                tracing::debug!("cannot inspect {}: {}", path.display(), e);
                false
            }
        }
    }
}
