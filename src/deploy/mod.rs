// ABOUTME: Deployment orchestration using the type state pattern.
// ABOUTME: Exports the plan, state markers, Deployment struct, orchestrator and deploy lock.

mod deployment;
mod error;
mod lock;
mod orchestrator;
mod outcome;
mod plan;
mod state;
mod transitions;

pub use deployment::Deployment;
pub use error::StageError;
pub use lock::{DeployLock, LockError, LockInfo};
pub use orchestrator::Orchestrator;
pub use outcome::{DeploymentOutcome, DeploymentReport, EXIT_USAGE};
pub use plan::DeploymentPlan;
pub use state::{Completed, Initialized, Inspected, Replaced, Started, Stopped};
pub use transitions::TransitionResult;
