//! basin stats - store, cache, and learner statistics

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::app::AppContext;
use crate::error::Result;
use crate::learner::LearningStats;

#[derive(Args, Debug)]
pub struct StatsArgs {}

#[derive(Debug, Serialize)]
struct StatsReport {
    db_path: String,
    documents: u64,
    cache_entries: usize,
    cache_hits: u64,
    cache_misses: u64,
    learner: LearningStats,
}

pub fn run(ctx: &AppContext, _args: &StatsArgs, json: bool) -> Result<()> {
    let cache_stats = ctx.cache.stats();
    let report = StatsReport {
        db_path: ctx.config.db_path.display().to_string(),
        documents: ctx.store.count()?,
        cache_entries: ctx.cache.len(),
        cache_hits: cache_stats.hits,
        cache_misses: cache_stats.misses,
        learner: ctx.learner.stats(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "store".bold());
    println!("  db:        {}", report.db_path);
    println!("  documents: {}", report.documents);
    println!("{}", "cache".bold());
    println!("  entries:   {}", report.cache_entries);
    println!(
        "  hits/misses: {}/{}",
        report.cache_hits, report.cache_misses
    );
    println!("{}", "learner".bold());
    println!("  queued:    {}", report.learner.urls_queued);
    println!("  crawled:   {}", report.learner.urls_crawled);
    println!("  failed:    {}", report.learner.urls_failed);
    println!("  added:     {}", report.learner.documents_added);
    println!("  queue:     {}", report.learner.queue_size);
    println!("  running:   {}", report.learner.running);
    Ok(())
}
