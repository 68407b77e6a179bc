// ABOUTME: The single deployable unit handed over by the build stage.
// ABOUTME: Derives the deployed file name and the exploded directory name from the logical name.

use std::path::{Path, PathBuf};

use super::ArtifactName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentArtifact {
    pub name: ArtifactName,
    pub version: Option<String>,
    pub source: PathBuf,
    pub extension: String,
}

impl DeploymentArtifact {
    /// File name under the deploy directory, e.g. `app.war`.
    pub fn deployed_file_name(&self) -> String {
        format!("{}.{}", self.name, self.extension)
    }

    /// Directory the server expands the artifact into, e.g. `app`.
    pub fn exploded_dir_name(&self) -> &str {
        self.name.as_str()
    }

    /// Hidden staging name used while copying.
    pub fn staging_file_name(&self) -> String {
        format!(".{}.part", self.deployed_file_name())
    }

    pub fn deployed_path(&self, deploy_dir: &Path) -> PathBuf {
        deploy_dir.join(self.deployed_file_name())
    }

    pub fn exploded_path(&self, deploy_dir: &Path) -> PathBuf {
        deploy_dir.join(self.exploded_dir_name())
    }

    /// `name` or `name@version` for messages.
    pub fn label(&self) -> String {
        match &self.version {
            Some(v) => format!("{}@{}", self.name, v),
            None => self.name.to_string(),
        }
    }
}
