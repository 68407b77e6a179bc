// ABOUTME: Entry point for the catapult CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use catapult::config;
use catapult::deploy::EXIT_USAGE;
use catapult::error::Result;
use catapult::output::{Output, OutputMode};
use clap::Parser;
use cli::{Cli, Commands};
use commands::ConfigSource;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    match run(cli, Output::new(mode)).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            Output::new(mode).error(&e.to_string());
            std::process::exit(EXIT_USAGE);
        }
    }
}

async fn run(cli: Cli, output: Output) -> Result<i32> {
    let cwd = env::current_dir()?;
    let source = ConfigSource::new(&cwd, cli.config.as_deref());

    match cli.command {
        Commands::Init {
            artifact,
            root,
            force,
        } => {
            config::init_config(&cwd, artifact.as_deref(), root.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(0)
        }
        Commands::Deploy {
            destination,
            artifact,
            force,
        } => {
            let config = source.load(destination.as_deref(), artifact)?;
            commands::deploy(config, destination.as_deref(), force, output).await
        }
        Commands::Check { destination } => {
            let config = source.load(destination.as_deref(), None)?;
            commands::check(&config, &output).await
        }
        Commands::Status { destination } => {
            let config = source.load(destination.as_deref(), None)?;
            commands::status(&config, &output).await
        }
        Commands::Logs { destination, tail } => {
            let config = source.load(destination.as_deref(), None)?;
            commands::logs(&config, tail).await
        }
    }
}
