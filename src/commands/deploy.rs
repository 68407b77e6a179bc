// ABOUTME: Deploy command implementation.
// ABOUTME: Handles the deploy lock, hooks, and running the orchestrator.

use catapult::config::Config;
use catapult::deploy::{DeployLock, DeploymentPlan, Orchestrator};
use catapult::diagnostics::Warning;
use catapult::error::Result;
use catapult::hooks::{HookContext, HookPoint, HookRunner};
use catapult::host::{HostFileSystem, HostProcessRunner};
use catapult::output::Output;
use std::env;
use std::path::PathBuf;

/// Deploy the configured artifact. Returns the process exit code.
pub async fn deploy(
    config: Config,
    destination: Option<&str>,
    force: bool,
    mut output: Output,
) -> Result<i32> {
    output.start_timer();
    let plan = DeploymentPlan::from_config(&config)?;
    let hook_runner = HookRunner::new(&config.base_dir);
    let hook_context = HookContext::new(&plan, destination);

    output.progress(&format!(
        "Deploying {} to {}",
        plan.artifact.label(),
        plan.installation.root.display()
    ));

    hook_runner.fire(HookPoint::PreDeploy, &hook_context).await?;

    let lock = if config.lock.enabled {
        output.progress("  → Acquiring deploy lock...");
        Some(DeployLock::acquire(
            &lock_dir(&config),
            &plan.installation.root,
            force,
        )?)
    } else {
        None
    };

    let fs = HostFileSystem;
    let runner = HostProcessRunner;
    let mut report = Orchestrator::new(&fs, &runner, &plan).run().await;

    if let Some(lock) = lock
        && let Err(e) = lock.release()
    {
        report
            .warnings
            .push(Warning::lock_release(format!("failed to release deploy lock: {}", e)));
    }

    let point = HookPoint::after(report.outcome);
    let context = hook_context.with_outcome(report.outcome);
    if let Some(warning) = hook_runner.fire(point, &context).await? {
        report.warnings.push(warning);
    }

    output.report(&report);
    Ok(report.exit_code())
}

/// Configured lock directory, or `~/.local/state/catapult`.
fn lock_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.lock.dir {
        return dir.clone();
    }
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".local/state/catapult"),
        None => env::temp_dir().join("catapult"),
    }
}
