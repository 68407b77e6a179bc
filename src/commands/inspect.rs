// ABOUTME: Read-mostly commands: check, status and logs.
// ABOUTME: Each builds the deployment plan and asks one component about the installation.

use catapult::config::Config;
use catapult::deploy::{DeploymentOutcome, DeploymentPlan};
use catapult::error::Result;
use catapult::host::{FileSystem, HostFileSystem, HostProcessRunner};
use catapult::inspect::HostInspector;
use catapult::output::Output;
use catapult::process::{ProcessController, ServerProcessState};
use serde::Serialize;
use std::path::PathBuf;

/// Run the pre-flight checks a deployment would run.
pub async fn check(config: &Config, output: &Output) -> Result<i32> {
    let plan = DeploymentPlan::from_config(config)?;
    let fs = HostFileSystem;

    match HostInspector::new(&fs).check(&plan.installation).await {
        Ok(report) => {
            for path in &report.repaired {
                output.warning(&format!("restored execute permission on {}", path.display()));
            }
            output.success(&format!(
                "{} is ready for deployment",
                plan.installation.root.display()
            ));
            Ok(0)
        }
        Err(e) => {
            output.error(&e.to_string());
            Ok(DeploymentOutcome::PrecheckFailed.exit_code())
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    root: PathBuf,
    state: ServerProcessState,
    artifact: String,
    deployed: bool,
    exploded: bool,
    contents: Vec<String>,
}

/// Report the server's process state and what its content directory holds.
pub async fn status(config: &Config, output: &Output) -> Result<i32> {
    let plan = DeploymentPlan::from_config(config)?;
    let fs = HostFileSystem;
    let runner = HostProcessRunner;
    let installation = &plan.installation;

    let controller = ProcessController::observe(&runner, installation).await?;
    let deploy_dir = &installation.deploy_dir;
    let deployed = fs
        .metadata(&plan.artifact.deployed_path(deploy_dir))
        .await?
        .is_some_and(|info| info.is_file());
    let exploded = fs
        .metadata(&plan.artifact.exploded_path(deploy_dir))
        .await?
        .is_some_and(|info| info.is_dir());
    let contents = match fs.list_dir(deploy_dir).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("cannot list {}: {}", deploy_dir.display(), e);
            Vec::new()
        }
    };

    let status = StatusReport {
        root: installation.root.clone(),
        state: controller.state(),
        artifact: plan.artifact.label(),
        deployed,
        exploded,
        contents,
    };

    output.record("status", &status);
    output.progress(&format!("Server:   {}", status.root.display()));
    output.progress(&format!("State:    {}", status.state));
    output.progress(&format!(
        "Artifact: {} ({})",
        status.artifact,
        match (status.deployed, status.exploded) {
            (true, true) => "deployed",
            (true, false) => "copied, not yet extracted",
            (false, _) => "not deployed",
        }
    ));
    if !status.contents.is_empty() {
        output.progress(&format!("Contents: {}", status.contents.join(", ")));
    }
    if output.mode() == catapult::output::OutputMode::Quiet {
        println!("{}", status.state);
    }

    Ok(0)
}

/// Print the last `tail` lines of the server log.
pub async fn logs(config: &Config, tail: usize) -> Result<i32> {
    let plan = DeploymentPlan::from_config(config)?;
    let lines = HostFileSystem
        .read_tail(&plan.installation.log_file, tail)
        .await?;
    for line in lines {
        println!("{line}");
    }
    Ok(0)
}
