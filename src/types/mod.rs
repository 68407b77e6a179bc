// ABOUTME: Validated domain types shared across components.
// ABOUTME: Names and patterns are checked once at the config boundary; layouts are resolved once.

mod artifact;
mod artifact_name;
mod installation;
mod process_matcher;

pub use artifact::DeploymentArtifact;
pub use artifact_name::{ArtifactName, ArtifactNameError};
pub use installation::ServerInstallation;
pub use process_matcher::{ProcessMatcher, ProcessMatcherError};
