//! Command-line interface for basin

pub mod commands;

use std::path::PathBuf;

use clap::Parser;

pub use commands::Commands;

/// basin - geometric web search with continuous learning
#[derive(Parser, Debug)]
#[command(name = "basin", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path override
    #[arg(long, global = true, env = "BASIN_DB_PATH")]
    pub db: Option<PathBuf>,

    /// Emit machine-readable JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}
