// ABOUTME: Settings describing the artifact handed over by the build stage.
// ABOUTME: One logical name, one source file, one extension.

use serde::Deserialize;
use std::path::PathBuf;

use super::deserialize::deserialize_artifact_name;
use crate::types::ArtifactName;

#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactConfig {
    #[serde(deserialize_with = "deserialize_artifact_name")]
    pub name: ArtifactName,

    /// Path of the packaged file. Relative paths resolve against the
    /// directory holding the config file.
    pub source: PathBuf,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    "war".to_string()
}
