// ABOUTME: Lifecycle control of the application server process.
// ABOUTME: Stop with escalation, detached start, and liveness checks against the process table.

mod controller;
mod error;
mod state;

pub use controller::ProcessController;
pub use error::{StartError, StopError};
pub use state::{ServerProcessState, StopOutcome};
