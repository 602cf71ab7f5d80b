//! basin search - rank stored documents against a query

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    /// Maximum number of results
    #[arg(long, short, default_value = "10")]
    pub limit: usize,
}

pub fn run(ctx: &AppContext, args: &SearchArgs, json: bool) -> Result<()> {
    let results = ctx.orchestrator.search(&args.query, args.limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("{}", "no matching documents".dimmed());
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        let title = if result.title.is_empty() {
            result.url.as_str()
        } else {
            result.title.as_str()
        };
        println!(
            "{:>2}. {} {}",
            i + 1,
            title.bold(),
            format!("(d={:.4})", result.distance).dimmed()
        );
        println!("    {}", result.url.blue());
        if !result.snippet.is_empty() {
            println!("    {}", result.snippet);
        }
    }
    Ok(())
}
