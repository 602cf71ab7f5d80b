//! basin learn - crawl seed URLs into the store

use std::time::Duration;

use clap::Args;
use colored::Colorize;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::app::AppContext;
use crate::core::geometry::{DEFAULT_EPS, measure_phi};
use crate::error::Result;
use crate::index::document::{Document, doc_id_for_url};

#[derive(Args, Debug)]
pub struct LearnArgs {
    /// Seed URLs to crawl
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Priority assigned to every seed
    #[arg(long, short, default_value = "0")]
    pub priority: i64,

    /// Re-crawl and overwrite documents that already exist
    #[arg(long)]
    pub reindex: bool,
}

pub async fn run(ctx: &AppContext, args: &LearnArgs, json: bool) -> Result<()> {
    if args.reindex {
        return reindex(ctx, &args.urls, json).await;
    }

    let mut accepted = 0;
    for url in &args.urls {
        if ctx.learner.enqueue(url, args.priority, "seed") {
            accepted += 1;
        } else {
            debug!(url, "already seen, skipped");
        }
    }

    if !json {
        println!("queued {accepted} of {} urls", args.urls.len());
    }

    drain(ctx).await;

    let stats = ctx.learner.stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!(
            "crawled {} ({} added, {} failed)",
            stats.urls_crawled,
            stats.documents_added.to_string().green(),
            stats.urls_failed.to_string().red()
        );
    }
    Ok(())
}

/// Overwrite path: fetch each URL and upsert, replacing any existing
/// document with the same id. The background learner never overwrites;
/// this is the explicit re-crawl pipeline.
async fn reindex(ctx: &AppContext, urls: &[String], json: bool) -> Result<()> {
    let mut updated = 0u64;
    let mut failed = 0u64;

    for url in urls {
        match ctx.fetcher.fetch_page(url).await {
            Ok(page) => {
                let basin = ctx.encoder.encode(&page.text);
                let phi = measure_phi(&basin, DEFAULT_EPS);
                ctx.store.upsert_document(&Document {
                    doc_id: doc_id_for_url(url),
                    url: url.clone(),
                    title: page.title,
                    text: page.text,
                    basin,
                    phi,
                })?;
                info!(url, phi, "reindexed");
                updated += 1;
            }
            Err(e) => {
                debug!(url, error = %e, "reindex fetch failed");
                failed += 1;
            }
        }
    }

    if json {
        println!(
            "{}",
            serde_json::json!({ "updated": updated, "failed": failed })
        );
    } else {
        println!("reindexed {updated} urls ({failed} failed)");
    }
    Ok(())
}

/// Run the learner until its queue drains (or ctrl-c), then stop it.
pub(crate) async fn drain(ctx: &AppContext) {
    ctx.learner.start();

    let idle_wait = Duration::from_millis(ctx.config.crawl_delay_ms / 2 + 50);
    loop {
        tokio::select! {
            _ = sleep(idle_wait) => {
                if ctx.learner.stats().queue_size == 0 {
                    // One more delay so the final in-flight task can finish.
                    sleep(Duration::from_millis(ctx.config.crawl_delay_ms)).await;
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    ctx.learner.stop().await;
}
