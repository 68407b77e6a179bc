// ABOUTME: Error types for process lifecycle operations.
// ABOUTME: Stop only fails when the process table cannot be read; start fails if nothing comes up.

use std::time::Duration;

use crate::host::ProcessError;

#[derive(Debug, thiserror::Error)]
pub enum StopError {
    #[error("cannot determine whether the server is running: {0}")]
    ProcessTable(#[source] ProcessError),
}

#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("failed to launch start script: {0}")]
    Launch(#[source] ProcessError),

    #[error("no server process found {:.1}s after start", .waited.as_secs_f64())]
    NotRunning { waited: Duration },

    #[error("cannot determine whether the server started: {0}")]
    ProcessTable(#[source] ProcessError),
}
