// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catapult")]
#[command(about = "Stop-swap-start deployment of web artifacts onto an application server")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output (for CI)
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Output JSON lines (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the configuration file (default: discovered in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new catapult.yml configuration file
    Init {
        /// Artifact name (the context path it is served under)
        #[arg(short, long)]
        artifact: Option<String>,

        /// Server installation root
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Overwrite existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Stop the server, replace the artifact and start it again
    Deploy {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,

        /// Artifact file to deploy, overriding the configured source
        #[arg(short, long)]
        artifact: Option<PathBuf>,

        /// Break an existing deploy lock
        #[arg(short, long)]
        force: bool,
    },

    /// Check the server installation without changing anything but script permissions
    Check {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,
    },

    /// Show whether the server is running and what is deployed
    Status {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,
    },

    /// Show the tail of the server log
    Logs {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,

        /// Number of lines to show
        #[arg(short = 'n', long, default_value = "50")]
        tail: usize,
    },
}
