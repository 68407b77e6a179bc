// ABOUTME: Immutable deployment plan built once from configuration.
// ABOUTME: Components receive resolved paths and timings from here instead of reading the environment.

use std::time::Duration;

use crate::config::{Config, LingeringPolicy, resolve_env_map};
use crate::error::{Error, Result};
use crate::poll::PollPolicy;
use crate::types::{DeploymentArtifact, ProcessMatcher, ServerInstallation};

/// Everything one deployment run needs to know.
#[derive(Debug, Clone)]
pub struct DeploymentPlan {
    pub installation: ServerInstallation,
    pub artifact: DeploymentArtifact,
    pub stop: PollPolicy,
    pub kill_wait: Duration,
    pub on_lingering: LingeringPolicy,
    pub start: PollPolicy,
    pub verify: PollPolicy,
    pub log_tail_lines: usize,
}

impl DeploymentPlan {
    /// Resolve a config into a plan. `server.env` references are read here.
    pub fn from_config(config: &Config) -> Result<Self> {
        let server = &config.server;
        let matcher = ProcessMatcher::new(&server.process_pattern())
            .map_err(|e| Error::InvalidConfig(format!("server.process_match: {}", e)))?;

        let installation = ServerInstallation {
            root: server.root.clone(),
            start_script: server.resolve(&server.start_script),
            stop_script: server.resolve(&server.stop_script),
            deploy_dir: server.resolve(&server.deploy_dir),
            log_file: server.resolve(&server.log_file),
            matcher,
            env: resolve_env_map(&server.env)?,
        };

        let artifact = DeploymentArtifact {
            name: config.artifact.name.clone(),
            version: config.artifact.version.clone(),
            source: config.artifact_source(),
            extension: config.artifact.extension.clone(),
        };

        Ok(DeploymentPlan {
            installation,
            artifact,
            stop: config.stop.poll_policy(),
            kill_wait: config.stop.kill_wait,
            on_lingering: config.stop.on_lingering,
            start: config.start.poll_policy(),
            verify: config.verify.poll_policy(),
            log_tail_lines: config.diagnostics.log_tail_lines,
        })
    }
}
