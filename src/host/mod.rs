// ABOUTME: Capability traits for everything catapult does to the host.
// ABOUTME: Filesystem and process-table access go through these so components can run against fakes.

mod filesystem;
mod process;

pub use filesystem::{EntryInfo, EntryKind, FileSystem, HostFileSystem};
pub use process::{
    HostProcessRunner, ProcessError, ProcessRunner, ScriptInvocation, ScriptOutput, Signal,
};
