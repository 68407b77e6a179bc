// ABOUTME: Application server installation settings.
// ABOUTME: Script, deploy and log paths are relative to the install root unless absolute.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::EnvValue;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub root: PathBuf,

    #[serde(default = "default_start_script")]
    pub start_script: PathBuf,

    #[serde(default = "default_stop_script")]
    pub stop_script: PathBuf,

    #[serde(default = "default_deploy_dir")]
    pub deploy_dir: PathBuf,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Pattern matched against process command lines. Defaults to the
    /// `catalina.base` system property for `root`.
    #[serde(default)]
    pub process_match: Option<String>,

    /// Extra environment for the start and stop scripts.
    #[serde(default)]
    pub env: HashMap<String, EnvValue>,
}

fn default_start_script() -> PathBuf {
    PathBuf::from("bin/startup.sh")
}

fn default_stop_script() -> PathBuf {
    PathBuf::from("bin/shutdown.sh")
}

fn default_deploy_dir() -> PathBuf {
    PathBuf::from("webapps")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("logs/catalina.out")
}

impl ServerConfig {
    /// A server rooted at `root` with every other setting defaulted.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        ServerConfig {
            root: root.into(),
            start_script: default_start_script(),
            stop_script: default_stop_script(),
            deploy_dir: default_deploy_dir(),
            log_file: default_log_file(),
            process_match: None,
            env: HashMap::new(),
        }
    }

    /// Resolve a path against the install root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// The configured match pattern, or the `catalina.base` default.
    pub fn process_pattern(&self) -> String {
        self.process_match
            .clone()
            .unwrap_or_else(|| format!("catalina.base={}", self.root.display()))
    }
}
