//! basin web - hybrid web search

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct WebArgs {
    /// Search query
    pub query: String,

    /// Maximum number of results
    #[arg(long, short, default_value = "10")]
    pub limit: usize,

    /// Rank blend: 0 = pure geometry, 1 = pure provider order
    #[arg(long, short, default_value = "0.5")]
    pub alpha: f64,

    /// Queue result URLs for background learning and crawl them now
    #[arg(long)]
    pub learn: bool,
}

pub async fn run(ctx: &AppContext, args: &WebArgs, json: bool) -> Result<()> {
    let results = match ctx.cache.get(&args.query, args.limit, args.alpha) {
        Some(cached) => cached,
        None => {
            let fresh = ctx.hybrid.search(&args.query, args.limit, args.alpha).await;
            ctx.cache
                .put(&args.query, args.limit, args.alpha, fresh.clone());
            fresh
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        if ctx.hybrid.enabled() {
            println!("{}", "no results".dimmed());
        } else {
            println!(
                "{}",
                "web search disabled - set SERPER_API_KEY".yellow()
            );
        }
    } else {
        for (i, result) in results.iter().enumerate() {
            println!(
                "{:>2}. {} {}",
                i + 1,
                result.title.bold(),
                format!(
                    "(score={:.4} d={:.4} pos={})",
                    result.hybrid_score, result.basin_distance, result.serper_position
                )
                .dimmed()
            );
            println!("    {}", result.url.blue());
            if !result.snippet.is_empty() {
                println!("    {}", result.snippet);
            }
        }
    }

    if args.learn && !results.is_empty() {
        let accepted = ctx.learner.enqueue_hybrid_results(&results);
        if !json {
            println!("\nqueued {accepted} urls for learning");
        }
        super::learn::drain(ctx).await;
    }

    Ok(())
}
