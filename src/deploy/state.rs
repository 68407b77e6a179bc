// ABOUTME: Deployment state marker types for the type state pattern.
// ABOUTME: Each state carries what the previous stage established.

use std::path::{Path, PathBuf};

use crate::inspect::PrecheckReport;
use crate::process::StopOutcome;
use crate::verify::VerificationOutcome;

/// Initial state: plan loaded, nothing checked.
/// Available actions: `inspect()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Initialized;

/// Installation passed precheck.
/// Available actions: `stop()`
#[derive(Debug, Clone)]
pub struct Inspected {
    pub(crate) report: PrecheckReport,
}

/// Server is down (or lingering under the `warn` policy).
/// Available actions: `replace()`
#[derive(Debug, Clone)]
pub struct Stopped {
    pub(crate) outcome: StopOutcome,
}

impl Stopped {
    pub fn outcome(&self) -> &StopOutcome {
        &self.outcome
    }
}

/// New artifact is in the deploy directory.
/// Available actions: `start()`
#[derive(Debug, Clone)]
pub struct Replaced {
    pub(crate) deployed: PathBuf,
}

/// Server process is up again.
/// Available actions: `verify()`
#[derive(Debug, Clone)]
pub struct Started {
    pub(crate) deployed: PathBuf,
}

/// Terminal state.
/// Available actions: `finish()`
#[derive(Debug, Clone)]
pub struct Completed {
    pub(crate) deployed: PathBuf,
    pub(crate) verification: VerificationOutcome,
}

impl Completed {
    pub fn deployed(&self) -> &Path {
        &self.deployed
    }

    pub fn verification(&self) -> VerificationOutcome {
        self.verification
    }
}

impl Inspected {
    pub fn report(&self) -> &PrecheckReport {
        &self.report
    }
}
