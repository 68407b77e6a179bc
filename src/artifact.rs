// ABOUTME: Replaces the deployed artifact in the server's deploy directory.
// ABOUTME: Clears stale content for the logical name, stages the copy, then renames it into place.

use std::io;
use std::path::{Path, PathBuf};

use crate::host::FileSystem;
use crate::types::DeploymentArtifact;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The build stage reported success but there is no file to deploy.
    #[error("artifact not found at {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("cannot read artifact {}: {source}", path.display())]
    SourceUnreadable { path: PathBuf, source: io::Error },

    #[error("failed to remove stale {}: {source}", path.display())]
    RemoveStale { path: PathBuf, source: io::Error },

    #[error("failed to copy {} into place: {source}", path.display())]
    Copy { path: PathBuf, source: io::Error },

    #[error("deployed file {} failed verification: {reason}", path.display())]
    VerificationFailed { path: PathBuf, reason: String },
}

impl DeployError {
    /// True when nothing in the deploy directory was touched.
    pub fn is_source_missing(&self) -> bool {
        matches!(self, DeployError::SourceMissing(_))
    }
}

pub struct ArtifactDeployer<'a, F: FileSystem> {
    fs: &'a F,
}

impl<'a, F: FileSystem> ArtifactDeployer<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    /// Put `artifact` into `deploy_dir` under its canonical name.
    ///
    /// Both `<name>.<ext>` and the exploded `<name>` are removed first, so
    /// afterwards the deploy directory holds exactly one entry for the name.
    /// Returns the deployed path.
    ///
    /// # Errors
    ///
    /// `SourceMissing` and `SourceUnreadable` leave the deploy directory
    /// untouched. Every other variant may leave it without any content for
    /// the name.
    pub async fn replace(
        &self,
        deploy_dir: &Path,
        artifact: &DeploymentArtifact,
    ) -> Result<PathBuf, DeployError> {
        let source = self.fs.metadata(&artifact.source).await.map_err(|source| {
            DeployError::SourceUnreadable {
                path: artifact.source.clone(),
                source,
            }
        })?;
        if !source.is_some_and(|info| info.is_file()) {
            return Err(DeployError::SourceMissing(artifact.source.clone()));
        }

        let target = artifact.deployed_path(deploy_dir);
        let staging = deploy_dir.join(artifact.staging_file_name());

        for stale in [
            target.clone(),
            artifact.exploded_path(deploy_dir),
            staging.clone(),
        ] {
            self.remove(&stale).await?;
        }

        let copied = self
            .fs
            .copy(&artifact.source, &staging)
            .await
            .map_err(|source| DeployError::Copy {
                path: target.clone(),
                source,
            })?;
        self.fs
            .rename(&staging, &target)
            .await
            .map_err(|source| DeployError::Copy {
                path: target.clone(),
                source,
            })?;
        tracing::debug!("copied {} bytes to {}", copied, target.display());

        self.verify(&target).await?;
        tracing::info!(
            "deployed {} to {}",
            artifact.label(),
            target.display()
        );
        Ok(target)
    }

    async fn remove(&self, path: &Path) -> Result<(), DeployError> {
        // Not following links, so a dangling `<name>` link is still removed.
        let info = self
            .fs
            .symlink_metadata(path)
            .await
            .map_err(|source| DeployError::RemoveStale {
                path: path.to_path_buf(),
                source,
            })?;

        let result = match info {
            None => return Ok(()),
            Some(info) if info.is_dir() => self.fs.remove_dir_all(path).await,
            Some(_) => self.fs.remove_file(path).await,
        };

        result.map_err(|source| DeployError::RemoveStale {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("removed stale {}", path.display());
        Ok(())
    }

    async fn verify(&self, target: &Path) -> Result<(), DeployError> {
        let failed = |reason: &str| DeployError::VerificationFailed {
            path: target.to_path_buf(),
            reason: reason.to_string(),
        };

        match self.fs.metadata(target).await {
            Ok(Some(info)) if info.is_file() && info.len > 0 => Ok(()),
            Ok(Some(info)) if info.is_file() => Err(failed("file is empty")),
            Ok(Some(_)) => Err(failed("not a regular file")),
            Ok(None) => Err(failed("file is missing")),
            Err(e) => Err(failed(&e.to_string())),
        }
    }
}
