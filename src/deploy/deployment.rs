// ABOUTME: Generic deployment struct parameterized by state marker.
// ABOUTME: State types carry their own data for compile-time guarantees.

use crate::diagnostics::Diagnostics;
use crate::types::{DeploymentArtifact, ServerInstallation};

use super::plan::DeploymentPlan;
use super::state::Initialized;

/// A deployment in progress, parameterized by its current state.
///
/// Transitions consume the deployment, so a stage can only run after the one
/// before it succeeded. Non-fatal warnings travel with the deployment through
/// every state, including the failed one handed back on error.
#[derive(Debug)]
pub struct Deployment<'a, S> {
    pub(crate) plan: &'a DeploymentPlan,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) state: S,
}

impl<'a> Deployment<'a, Initialized> {
    pub fn new(plan: &'a DeploymentPlan) -> Self {
        Deployment {
            plan,
            diagnostics: Diagnostics::default(),
            state: Initialized,
        }
    }
}

impl<'a, S> Deployment<'a, S> {
    pub fn plan(&self) -> &'a DeploymentPlan {
        self.plan
    }

    pub fn installation(&self) -> &'a ServerInstallation {
        &self.plan.installation
    }

    pub fn artifact(&self) -> &'a DeploymentArtifact {
        &self.plan.artifact
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Drop the state, keeping the collected warnings.
    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }
}
