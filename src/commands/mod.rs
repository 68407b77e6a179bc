// ABOUTME: Command module aggregator for the catapult CLI.
// ABOUTME: Re-exports command handlers and the shared config loading.

mod deploy;
mod inspect;

pub use deploy::deploy;
pub use inspect::{check, logs, status};

use catapult::config::Config;
use catapult::error::Result;
use std::path::{Path, PathBuf};

/// Where the configuration comes from: an explicit `--config` path or discovery.
pub struct ConfigSource<'a> {
    cwd: &'a Path,
    explicit: Option<&'a Path>,
}

impl<'a> ConfigSource<'a> {
    pub fn new(cwd: &'a Path, explicit: Option<&'a Path>) -> Self {
        Self { cwd, explicit }
    }

    /// Load the config and apply destination and artifact overrides.
    pub fn load(&self, destination: Option<&str>, artifact: Option<PathBuf>) -> Result<Config> {
        let config = match self.explicit {
            Some(path) => Config::load(path)?,
            None => Config::discover(self.cwd)?,
        };

        // Apply destination overrides if specified
        let config = if let Some(dest) = destination {
            config.for_destination(dest)?
        } else {
            config
        };

        // A flag path is relative to where the command runs, not to the config file
        Ok(match artifact {
            Some(path) => config.with_artifact_source(self.cwd.join(path)),
            None => config,
        })
    }
}
