// ABOUTME: Terminal outcome and report of a deployment run.
// ABOUTME: Outcomes map to distinct exit codes so pipelines can triage without parsing text.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::diagnostics::Warning;
use crate::process::ServerProcessState;
use crate::verify::VerificationOutcome;

/// Exit code for failures before the orchestrator runs (config, lock, hooks).
pub const EXIT_USAGE: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentOutcome {
    Success,
    PrecheckFailed,
    StopFailed,
    ArtifactMissing,
    DeployFailed,
    StartFailed,
    VerificationFailed,
}

impl DeploymentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeploymentOutcome::Success)
    }

    /// Process exit code reported to the calling pipeline.
    pub fn exit_code(&self) -> i32 {
        match self {
            DeploymentOutcome::Success => 0,
            DeploymentOutcome::PrecheckFailed => 2,
            DeploymentOutcome::StopFailed => 3,
            DeploymentOutcome::ArtifactMissing => 4,
            DeploymentOutcome::DeployFailed => 5,
            DeploymentOutcome::StartFailed => 6,
            DeploymentOutcome::VerificationFailed => 7,
        }
    }

    /// Whether the server was touched. A precheck failure leaves it exactly
    /// as it was.
    pub fn was_attempted(&self) -> bool {
        !matches!(self, DeploymentOutcome::PrecheckFailed)
    }
}

impl fmt::Display for DeploymentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeploymentOutcome::Success => "success",
            DeploymentOutcome::PrecheckFailed => "precheck failed",
            DeploymentOutcome::StopFailed => "stop failed",
            DeploymentOutcome::ArtifactMissing => "artifact missing",
            DeploymentOutcome::DeployFailed => "deploy failed",
            DeploymentOutcome::StartFailed => "start failed",
            DeploymentOutcome::VerificationFailed => "verification failed",
        };
        f.write_str(s)
    }
}

/// Everything the caller learns from one run.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentReport {
    pub outcome: DeploymentOutcome,
    pub artifact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployed_path: Option<PathBuf>,
    /// Server state when the run began, if it got far enough to look.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<ServerProcessState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_state: Option<ServerProcessState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationOutcome>,
    pub warnings: Vec<Warning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Last lines of the server log, collected on fatal failure only.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub log_tail: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
}

impl DeploymentReport {
    pub fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }
}
