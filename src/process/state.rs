// ABOUTME: Observed lifecycle state of the server process.
// ABOUTME: Only the process controller moves a server between these states.

use serde::Serialize;
use std::fmt;

/// Lifecycle state as last observed by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerProcessState {
    Stopped,
    Stopping,
    Running,
    StartFailed,
}

impl fmt::Display for ServerProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServerProcessState::Stopped => "stopped",
            ServerProcessState::Stopping => "stopping",
            ServerProcessState::Running => "running",
            ServerProcessState::StartFailed => "start failed",
        };
        f.write_str(s)
    }
}

/// How a stop request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// Nothing matched; nothing was touched.
    AlreadyStopped,
    /// The stop script cleared the process within the grace window.
    Graceful,
    /// A forced kill cleared the process.
    Forced,
    /// Matching processes survived the forced kill.
    Lingering(Vec<u32>),
}

impl StopOutcome {
    /// Pids that outlived the forced stop, if any.
    pub fn survivors(&self) -> Option<&[u32]> {
        match self {
            StopOutcome::Lingering(pids) => Some(pids),
            _ => None,
        }
    }
}
