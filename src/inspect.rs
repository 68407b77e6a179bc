// ABOUTME: Pre-flight inspection of the server installation.
// ABOUTME: Checks layout in a fixed order and repairs missing execute bits once.

use std::path::{Path, PathBuf};

use crate::host::FileSystem;
use crate::types::ServerInstallation;

/// Why an installation is not fit for a deployment.
#[derive(Debug, thiserror::Error)]
pub enum PrecheckError {
    #[error("install root not found: {}", .0.display())]
    RootMissing(PathBuf),

    #[error("stop script not found: {}", .0.display())]
    StopScriptMissing(PathBuf),

    #[error("start script not found: {}", .0.display())]
    StartScriptMissing(PathBuf),

    #[error("deploy directory not found: {}", .0.display())]
    ContentDirMissing(PathBuf),

    #[error("{} is not executable and could not be made executable: {reason}", path.display())]
    PermissionRepairFailed { path: PathBuf, reason: String },

    #[error("failed to inspect {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What the inspector found and changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecheckReport {
    /// Scripts that were missing execute permission and were fixed.
    pub repaired: Vec<PathBuf>,
}

/// Verifies an installation before anything destructive happens.
pub struct HostInspector<'a, F: FileSystem> {
    fs: &'a F,
}

impl<'a, F: FileSystem> HostInspector<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    /// Check the installation layout.
    ///
    /// Order: root directory, stop script, start script, deploy directory,
    /// then execute permission on both scripts. Repairing permissions is the
    /// only mutation performed.
    ///
    /// # Errors
    ///
    /// Returns the first problem found; a missing path is never repaired.
    pub async fn check(
        &self,
        installation: &ServerInstallation,
    ) -> Result<PrecheckReport, PrecheckError> {
        if !self.is_dir(&installation.root).await? {
            return Err(PrecheckError::RootMissing(installation.root.clone()));
        }
        if !self.is_file(&installation.stop_script).await? {
            return Err(PrecheckError::StopScriptMissing(
                installation.stop_script.clone(),
            ));
        }
        if !self.is_file(&installation.start_script).await? {
            return Err(PrecheckError::StartScriptMissing(
                installation.start_script.clone(),
            ));
        }
        if !self.is_dir(&installation.deploy_dir).await? {
            return Err(PrecheckError::ContentDirMissing(
                installation.deploy_dir.clone(),
            ));
        }

        let mut report = PrecheckReport::default();
        for script in [&installation.stop_script, &installation.start_script] {
            if self.ensure_executable(script).await? {
                report.repaired.push(script.clone());
            }
        }

        tracing::debug!(
            "installation at {} passed precheck",
            installation.root.display()
        );
        Ok(report)
    }

    /// Returns true if permissions had to be repaired.
    async fn ensure_executable(&self, script: &Path) -> Result<bool, PrecheckError> {
        if self.is_executable(script).await? {
            return Ok(false);
        }

        tracing::info!("granting execute permission to {}", script.display());
        if let Err(e) = self.fs.set_executable(script).await {
            return Err(PrecheckError::PermissionRepairFailed {
                path: script.to_path_buf(),
                reason: e.to_string(),
            });
        }

        if !self.is_executable(script).await? {
            return Err(PrecheckError::PermissionRepairFailed {
                path: script.to_path_buf(),
                reason: "execute bit still missing after chmod".to_string(),
            });
        }

        Ok(true)
    }

    async fn is_dir(&self, path: &Path) -> Result<bool, PrecheckError> {
        Ok(self.entry(path).await?.is_some_and(|info| info.is_dir()))
    }

    async fn is_file(&self, path: &Path) -> Result<bool, PrecheckError> {
        Ok(self.entry(path).await?.is_some_and(|info| info.is_file()))
    }

    async fn is_executable(&self, path: &Path) -> Result<bool, PrecheckError> {
        Ok(self.entry(path).await?.is_some_and(|info| info.executable))
    }

    async fn entry(&self, path: &Path) -> Result<Option<crate::host::EntryInfo>, PrecheckError> {
        self.fs
            .metadata(path)
            .await
            .map_err(|source| PrecheckError::Io {
                path: path.to_path_buf(),
                source,
            })
    }
}
