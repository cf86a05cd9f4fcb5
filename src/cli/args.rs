//! CLI argument parsing

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "berth")]
#[command(author, version, about = "Start, stop and inspect named containers", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubCommand,

    /// Container manifest (JSON)
    #[arg(short, long, global = true, env = "BERTH_FILE", default_value = "berth.json")]
    pub file: PathBuf,

    /// Container engine binary, overrides the manifest
    #[arg(long, global = true, env = "BERTH_ENGINE")]
    pub engine: Option<String>,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log more (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum SubCommand {
    /// Check that the container engine is installed and answering
    Check,

    /// List the containers declared in the manifest
    List,

    /// Show the current status of a declared container
    Status {
        name: String,
    },

    /// Start containers (all declared ones when no name is given)
    Start {
        names: Vec<String>,
    },

    /// Stop and remove containers (all declared ones when no name is given)
    Stop {
        names: Vec<String>,
    },

    /// Stop, remove and start containers again
    Restart {
        names: Vec<String>,
    },

    /// Print the command that would create a container, without running it
    Plan {
        name: String,
    },
}
