// ABOUTME: Configuration types and parsing for catapult.yml.
// ABOUTME: Handles YAML parsing, discovery, destination overrides and path resolution.

mod artifact;
mod deserialize;
mod env_value;
mod init;
mod server;
mod stop;

pub use artifact::ArtifactConfig;
pub use env_value::{EnvValue, resolve_env_map};
pub use init::init_config;
pub use server::ServerConfig;
pub use stop::{LingeringPolicy, StartConfig, StopConfig, VerifyConfig};

use crate::error::{Error, Result};
use crate::types::ArtifactName;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "catapult.yml";
pub const CONFIG_FILENAME_ALT: &str = "catapult.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".catapult/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub artifact: ArtifactConfig,

    pub server: ServerConfig,

    #[serde(default)]
    pub stop: StopConfig,

    #[serde(default)]
    pub start: StartConfig,

    #[serde(default)]
    pub verify: VerifyConfig,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,

    #[serde(default)]
    pub lock: LockConfig,

    #[serde(default)]
    pub destinations: HashMap<String, Destination>,

    /// Directory relative artifact sources resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Destination {
    #[serde(default)]
    pub root: Option<PathBuf>,

    #[serde(default)]
    pub process_match: Option<String>,

    #[serde(default)]
    pub artifact_source: Option<PathBuf>,

    #[serde(default)]
    pub env: HashMap<String, EnvValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsConfig {
    /// Server log lines shown after a fatal failure.
    #[serde(default = "default_log_tail_lines")]
    pub log_tail_lines: usize,
}

fn default_log_tail_lines() -> usize {
    50
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        DiagnosticsConfig {
            log_tail_lines: default_log_tail_lines(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LockConfig {
    #[serde(default = "default_lock_enabled")]
    pub enabled: bool,

    /// Where lock files live. The CLI falls back to `~/.local/state/catapult`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_lock_enabled() -> bool {
    true
}

impl Default for LockConfig {
    fn default() -> Self {
        LockConfig {
            enabled: default_lock_enabled(),
            dir: None,
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                let mut config = Self::load(path)?;
                // `.catapult/config.yml` still resolves against the project dir.
                config.base_dir = dir.to_path_buf();
                return Ok(config);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    fn validate(&self) -> Result<()> {
        let ext = &self.artifact.extension;
        if ext.is_empty() || ext.starts_with('.') || ext.contains('/') {
            return Err(Error::InvalidConfig(format!(
                "artifact extension must be a bare suffix like \"war\", got {:?}",
                ext
            )));
        }

        if let Some(pattern) = &self.server.process_match
            && pattern.trim().is_empty()
        {
            return Err(Error::InvalidConfig(
                "server.process_match cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn for_destination(&self, name: &str) -> Result<Config> {
        let dest = self
            .destinations
            .get(name)
            .ok_or_else(|| Error::UnknownDestination(name.to_string()))?;

        let mut merged = self.clone();

        if let Some(ref root) = dest.root {
            merged.server.root = root.clone();
        }

        if let Some(ref pattern) = dest.process_match {
            merged.server.process_match = Some(pattern.clone());
        }

        if let Some(ref source) = dest.artifact_source {
            merged.artifact.source = source.clone();
        }

        // Deep merge env
        for (k, v) in &dest.env {
            merged.server.env.insert(k.clone(), v.clone());
        }

        Ok(merged)
    }

    /// Replace the artifact source, e.g. from a command-line flag.
    pub fn with_artifact_source(mut self, source: PathBuf) -> Self {
        self.artifact.source = source;
        self
    }

    /// The artifact source resolved against the config directory.
    pub fn artifact_source(&self) -> PathBuf {
        if self.artifact.source.is_absolute() {
            self.artifact.source.clone()
        } else {
            self.base_dir.join(&self.artifact.source)
        }
    }

    pub fn template() -> Self {
        Config {
            artifact: ArtifactConfig {
                name: ArtifactName::new("app").unwrap(),
                source: PathBuf::from("target/app.war"),
                version: None,
                extension: "war".to_string(),
            },
            server: ServerConfig::with_root("/opt/tomcat"),
            stop: StopConfig::default(),
            start: StartConfig::default(),
            verify: VerifyConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
            lock: LockConfig::default(),
            destinations: HashMap::new(),
            base_dir: PathBuf::new(),
        }
    }
}
