// ABOUTME: Library root for catapult - exposes the deployment components for testing.
// ABOUTME: The main binary is in main.rs.

pub mod artifact;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod hooks;
pub mod host;
pub mod inspect;
pub mod output;
pub mod poll;
pub mod process;
pub mod types;
pub mod verify;
