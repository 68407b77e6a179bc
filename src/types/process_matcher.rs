// ABOUTME: Pattern identifying the server process in the host process table.
// ABOUTME: Matched against full command lines, the way `pgrep -f` does.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProcessMatcherError {
    #[error("process match pattern cannot be empty")]
    Empty,

    #[error("process match pattern cannot contain newlines")]
    Multiline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessMatcher(String);

impl ProcessMatcher {
    pub fn new(pattern: &str) -> Result<Self, ProcessMatcherError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(ProcessMatcherError::Empty);
        }
        if pattern.contains('\n') || pattern.contains('\r') {
            return Err(ProcessMatcherError::Multiline);
        }
        Ok(Self(pattern.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProcessMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
