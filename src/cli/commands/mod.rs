//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod learn;
pub mod search;
pub mod stats;
pub mod web;

use crate::app::AppContext;
use crate::error::Result;

/// Dispatch a parsed subcommand
pub async fn run(ctx: &AppContext, command: &Commands, json: bool) -> Result<()> {
    match command {
        Commands::Search(args) => search::run(ctx, args, json),
        Commands::Web(args) => web::run(ctx, args, json).await,
        Commands::Learn(args) => learn::run(ctx, args, json).await,
        Commands::Stats(args) => stats::run(ctx, args, json),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the local document store by basin distance
    Search(search::SearchArgs),

    /// Web search re-ranked by basin geometry
    Web(web::WebArgs),

    /// Crawl seed URLs into the document store
    Learn(learn::LearnArgs),

    /// Show store, cache, and learner statistics
    Stats(stats::StatsArgs),
}
