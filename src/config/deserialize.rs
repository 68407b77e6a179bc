// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Validates artifact names at parse time.

use serde::Deserialize;

use crate::types::ArtifactName;

pub fn deserialize_artifact_name<'de, D>(deserializer: D) -> Result<ArtifactName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ArtifactName::new(&s).map_err(serde::de::Error::custom)
}
