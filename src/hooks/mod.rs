// ABOUTME: Project hook scripts run around a deployment.
// ABOUTME: A failing pre-deploy hook aborts the run; post-deploy and on-error hooks only warn.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::deploy::{DeploymentOutcome, DeploymentPlan};
use crate::diagnostics::Warning;
use crate::error::{Error, Result};

/// Where in a run a hook fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// Before the lock is taken and the server is touched.
    PreDeploy,
    /// After a successful run.
    PostDeploy,
    /// After a failed run.
    OnError,
}

impl HookPoint {
    /// Script name under `.catapult/hooks`.
    pub fn filename(&self) -> &'static str {
        match self {
            HookPoint::PreDeploy => "pre-deploy",
            HookPoint::PostDeploy => "post-deploy",
            HookPoint::OnError => "on-error",
        }
    }

    /// Whether a failing hook here stops the deployment.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HookPoint::PreDeploy)
    }

    /// The hook that follows a finished run.
    pub fn after(outcome: DeploymentOutcome) -> Self {
        if outcome.is_success() {
            HookPoint::PostDeploy
        } else {
            HookPoint::OnError
        }
    }
}

/// What a hook script learns about the deployment, as `CATAPULT_*` variables.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub artifact: String,
    pub version: Option<String>,
    pub source: PathBuf,
    pub server_root: PathBuf,
    pub deploy_dir: PathBuf,
    pub destination: Option<String>,
    pub outcome: Option<DeploymentOutcome>,
}

impl HookContext {
    pub fn new(plan: &DeploymentPlan, destination: Option<&str>) -> Self {
        Self {
            artifact: plan.artifact.name.to_string(),
            version: plan.artifact.version.clone(),
            source: plan.artifact.source.clone(),
            server_root: plan.installation.root.clone(),
            deploy_dir: plan.installation.deploy_dir.clone(),
            destination: destination.map(str::to_string),
            outcome: None,
        }
    }

    /// The same context, recording how the run ended.
    pub fn with_outcome(mut self, outcome: DeploymentOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Unset fields are left out rather than exported empty.
    pub fn to_env(&self) -> HashMap<String, String> {
        let path = |p: &Path| Some(p.display().to_string());
        [
            ("CATAPULT_ARTIFACT", Some(self.artifact.clone())),
            ("CATAPULT_SOURCE", path(&self.source)),
            ("CATAPULT_SERVER_ROOT", path(&self.server_root)),
            ("CATAPULT_DEPLOY_DIR", path(&self.deploy_dir)),
            ("CATAPULT_VERSION", self.version.clone()),
            ("CATAPULT_DESTINATION", self.destination.clone()),
            ("CATAPULT_OUTCOME", self.outcome.map(|o| o.to_string())),
            (
                "CATAPULT_EXIT_CODE",
                self.outcome.map(|o| o.exit_code().to_string()),
            ),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect()
    }
}

/// How a hook script exited.
#[derive(Debug)]
pub struct HookResult {
    /// `None` if the script could not be spawned or was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl HookResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    fn describe(&self, point: HookPoint) -> String {
        let status = match self.exit_code {
            Some(code) => format!("exited with code {code}"),
            None => "did not run to completion".to_string(),
        };
        match self.stderr.trim() {
            "" => format!("{} hook {}", point.filename(), status),
            stderr => format!("{} hook {}: {}", point.filename(), status, stderr),
        }
    }
}

/// Runs the hook scripts of one project directory.
pub struct HookRunner {
    project_dir: PathBuf,
}

impl HookRunner {
    pub fn new(project_dir: &Path) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
        }
    }

    pub fn hook_exists(&self, point: HookPoint) -> bool {
        self.hook_path(point).is_file()
    }

    fn hook_path(&self, point: HookPoint) -> PathBuf {
        self.project_dir
            .join(".catapult/hooks")
            .join(point.filename())
    }

    /// Run the hook for `point` and apply its failure policy.
    ///
    /// Returns a warning for a failed advisory hook, `None` when the hook is
    /// absent or succeeded.
    ///
    /// # Errors
    ///
    /// `Error::Hook` when a fatal hook fails.
    pub async fn fire(&self, point: HookPoint, context: &HookContext) -> Result<Option<Warning>> {
        let Some(result) = self.run(point, context).await else {
            return Ok(None);
        };
        if result.success() {
            return Ok(None);
        }

        let message = result.describe(point);
        if point.is_fatal() {
            return Err(Error::Hook(message));
        }
        Ok(Some(Warning::hook(message)))
    }

    /// Run the hook for `point` from the project directory.
    ///
    /// `None` if the project has no such hook. A script that cannot be
    /// spawned is reported as a failed result.
    pub async fn run(&self, point: HookPoint, context: &HookContext) -> Option<HookResult> {
        let script = self.hook_path(point);
        if !script.is_file() {
            return None;
        }
        tracing::info!("running {} hook for {}", point.filename(), context.artifact);

        let result = match Command::new(&script)
            .current_dir(&self.project_dir)
            .envs(context.to_env())
            .stdin(Stdio::null())
            .output()
            .await
        {
            Ok(output) => HookResult {
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
            Err(e) => HookResult {
                exit_code: None,
                stdout: String::new(),
                stderr: format!("cannot run {}: {}", script.display(), e),
            },
        };

        if result.success() {
            tracing::debug!("{} hook succeeded", point.filename());
        } else {
            tracing::warn!("{}", result.describe(point));
        }
        Some(result)
    }
}
