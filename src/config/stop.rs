// ABOUTME: Timing and escalation settings for stopping, starting and verifying the server.
// ABOUTME: Each phase is a settle window followed by a bounded number of checks.

use serde::Deserialize;
use std::time::Duration;

use crate::poll::PollPolicy;

/// What to do when the server survives both graceful and forced stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LingeringPolicy {
    /// Abort the run with `StopFailed` before touching deployed content.
    #[default]
    Fail,
    /// Record a warning and deploy anyway.
    Warn,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopConfig {
    #[serde(default = "default_grace_period", with = "humantime_serde")]
    pub grace_period: Duration,

    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,

    #[serde(default = "default_kill_wait", with = "humantime_serde")]
    pub kill_wait: Duration,

    #[serde(default)]
    pub on_lingering: LingeringPolicy,
}

impl StopConfig {
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(self.grace_period, self.poll_interval, self.poll_attempts)
    }
}

impl Default for StopConfig {
    fn default() -> Self {
        StopConfig {
            grace_period: default_grace_period(),
            poll_interval: default_poll_interval(),
            poll_attempts: default_poll_attempts(),
            kill_wait: default_kill_wait(),
            on_lingering: LingeringPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartConfig {
    #[serde(default = "default_settle", with = "humantime_serde")]
    pub settle: Duration,

    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,
}

impl StartConfig {
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(self.settle, self.poll_interval, self.poll_attempts)
    }
}

impl Default for StartConfig {
    fn default() -> Self {
        StartConfig {
            settle: default_settle(),
            poll_interval: default_poll_interval(),
            poll_attempts: default_poll_attempts(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyConfig {
    #[serde(default = "default_verify_wait", with = "humantime_serde")]
    pub wait: Duration,

    #[serde(default = "default_verify_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,
}

impl VerifyConfig {
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(self.wait, self.poll_interval, self.poll_attempts)
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        VerifyConfig {
            wait: default_verify_wait(),
            poll_interval: default_verify_interval(),
            poll_attempts: default_poll_attempts(),
        }
    }
}

fn default_grace_period() -> Duration {
    Duration::from_secs(10)
}

fn default_kill_wait() -> Duration {
    Duration::from_secs(5)
}

fn default_settle() -> Duration {
    Duration::from_secs(10)
}

fn default_verify_wait() -> Duration {
    Duration::from_secs(10)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_verify_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_poll_attempts() -> u32 {
    3
}
