//! basin - geometric web search CLI
//!
//! Search the web, re-rank by basin geometry, and keep learning from what
//! turns up.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use basinsearch::app::AppContext;
use basinsearch::cli::Cli;
use basinsearch::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": true,
                    "message": e.to_string(),
                });
                println!("{}", serde_json::to_string(&error_json).unwrap_or_default());
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> basinsearch::Result<()> {
    let mut config = Config::from_env();
    if let Some(db) = &cli.db {
        config.db_path.clone_from(db);
    }

    let ctx = AppContext::from_config(config)?;
    let result = basinsearch::cli::commands::run(&ctx, &cli.command, cli.json).await;
    ctx.shutdown().await;
    result
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,basinsearch=info",
        1 => "info,basinsearch=debug",
        2 => "debug,basinsearch=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.json {
        // JSON logging to stderr keeps stdout parseable
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
