// ABOUTME: Application-wide error types for catapult.
// ABOUTME: Covers everything that stops a run before the orchestrator gets to report an outcome.

use std::path::PathBuf;
use thiserror::Error;

use crate::deploy::LockError;
use crate::host::ProcessError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("unknown destination: {0}")]
    UnknownDestination(String),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("hook failed: {0}")]
    Hook(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
