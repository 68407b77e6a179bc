// ABOUTME: Logical artifact name validation.
// ABOUTME: A name must be usable as a single path component inside the deploy directory.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArtifactNameError {
    #[error("artifact name cannot be empty")]
    Empty,

    #[error("artifact name exceeds maximum length of 255 characters")]
    TooLong,

    #[error("artifact name cannot start with a dot")]
    StartsWithDot,

    #[error("invalid character in artifact name: '{0}'")]
    InvalidChar(char),
}

/// Logical name of a deployable unit, e.g. `app` for `app.war`.
///
/// The deployed file and the exploded directory are both derived from this
/// name, so it must never contain separators or start with a dot (which would
/// also exclude `.` and `..`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactName(String);

impl ArtifactName {
    pub fn new(value: &str) -> Result<Self, ArtifactNameError> {
        if value.is_empty() {
            return Err(ArtifactNameError::Empty);
        }

        if value.len() > 255 {
            return Err(ArtifactNameError::TooLong);
        }

        if value.starts_with('.') {
            return Err(ArtifactNameError::StartsWithDot);
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' && c != '_' && c != '.' && c != '#' {
                return Err(ArtifactNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
