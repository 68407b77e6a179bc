// ABOUTME: Resolved description of the target application server installation.
// ABOUTME: Immutable once built; every path is absolute or relative to the process cwd.

use std::collections::HashMap;
use std::path::PathBuf;

use super::ProcessMatcher;

/// The on-disk layout of the server plus how to recognise its process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInstallation {
    pub root: PathBuf,
    pub start_script: PathBuf,
    pub stop_script: PathBuf,
    /// Directory the server scans for deployable content.
    pub deploy_dir: PathBuf,
    pub log_file: PathBuf,
    pub matcher: ProcessMatcher,
    /// Environment passed to both scripts.
    pub env: HashMap<String, String>,
}
