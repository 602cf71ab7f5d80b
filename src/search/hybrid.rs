//! Hybrid web search: provider ranking blended with basin geometry
//!
//! Flow:
//! 1. Query the web search provider
//! 2. Fetch page content for each result (bounded fan-out)
//! 3. Encode content to basin vectors
//! 4. Blend provider rank and basin distance into one score
//! 5. Sort ascending and truncate
//!
//! A single result's fetch or parse failure never drops it from the batch:
//! the provider snippet stands in for the page text.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use crate::core::encoding::BasinEncoder;
use crate::core::geometry::basin_distance;
use crate::fetch::{PageFetcher, truncate_chars};
use crate::search::provider::{ProviderResult, SerperClient};

/// Tuning knobs for hybrid search
#[derive(Debug, Clone)]
pub struct HybridOptions {
    /// Fetch page content (false = rank on snippets only)
    pub fetch_content: bool,
    /// Maximum provider results requested and fetched
    pub max_fetch: usize,
    /// Concurrent page fetches
    pub fetch_concurrency: usize,
    /// Stored content excerpt length
    pub excerpt_len: usize,
}

impl Default for HybridOptions {
    fn default() -> Self {
        Self {
            fetch_content: true,
            max_fetch: 10,
            fetch_concurrency: 8,
            excerpt_len: 500,
        }
    }
}

/// A blended search result
#[derive(Debug, Clone, Serialize)]
pub struct HybridResult {
    /// Result URL
    pub url: String,
    /// Provider title
    pub title: String,
    /// Provider snippet
    pub snippet: String,
    /// Excerpt of the fetched content (or the snippet, on fallback)
    pub content: String,
    /// 1-based provider rank
    pub serper_position: usize,
    /// Angular distance between the query basin and the content basin
    pub basin_distance: f64,
    /// Blended score, lower is better
    pub hybrid_score: f64,
}

/// Orchestrates provider search, content fetch, and geometric re-ranking
pub struct HybridSearch {
    provider: SerperClient,
    fetcher: Arc<PageFetcher>,
    encoder: BasinEncoder,
    options: HybridOptions,
}

impl HybridSearch {
    /// Assemble a hybrid searcher from its collaborators
    pub fn new(
        provider: SerperClient,
        fetcher: Arc<PageFetcher>,
        encoder: BasinEncoder,
        options: HybridOptions,
    ) -> Self {
        Self { provider, fetcher, encoder, options }
    }

    /// Whether the underlying provider is usable
    pub fn enabled(&self) -> bool {
        self.provider.enabled()
    }

    /// Run a hybrid search.
    ///
    /// `alpha` blends the two rankings: 0 is pure geometry, 1 is pure
    /// provider order. An empty provider response yields an empty list; it
    /// is not an error.
    pub async fn search(&self, query: &str, limit: usize, alpha: f64) -> Vec<HybridResult> {
        let alpha = alpha.clamp(0.0, 1.0);

        let response = self.provider.search(query, self.options.max_fetch).await;
        if response.results.is_empty() {
            debug!(query, "no provider results");
            return Vec::new();
        }

        let query_basin = Arc::new(self.encoder.encode(query));

        let mut results = if self.options.fetch_content {
            self.fetch_all(&response.results, &query_basin).await
        } else {
            response
                .results
                .iter()
                .map(|r| self.from_snippet(r, &query_basin))
                .collect()
        };

        if results.is_empty() {
            return Vec::new();
        }

        score_results(&mut results, alpha);
        results.sort_by(|a, b| a.hybrid_score.total_cmp(&b.hybrid_score));
        results.truncate(limit);
        results
    }

    /// Fan out page fetches under a concurrency cap, preserving input order.
    async fn fetch_all(
        &self,
        provider_results: &[ProviderResult],
        query_basin: &Arc<Vec<f32>>,
    ) -> Vec<HybridResult> {
        let semaphore = Arc::new(Semaphore::new(self.options.fetch_concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (i, result) in provider_results
            .iter()
            .take(self.options.max_fetch)
            .cloned()
            .enumerate()
        {
            let semaphore = Arc::clone(&semaphore);
            let fetcher = Arc::clone(&self.fetcher);
            let encoder = self.encoder.clone();
            let query_basin = Arc::clone(query_basin);
            let excerpt_len = self.options.excerpt_len;

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let hybrid =
                    fetch_and_encode(&fetcher, &encoder, &query_basin, result, excerpt_len).await;
                (i, hybrid)
            });
        }

        let mut indexed: Vec<(usize, HybridResult)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(pair) => indexed.push(pair),
                Err(e) => debug!(error = %e, "hybrid fetch task aborted"),
            }
        }
        indexed.sort_by_key(|(i, _)| *i);
        indexed.into_iter().map(|(_, r)| r).collect()
    }

    /// Snippet-only result when content fetching is disabled
    fn from_snippet(&self, result: &ProviderResult, query_basin: &[f32]) -> HybridResult {
        let content_basin = self.encoder.encode(&result.snippet);
        HybridResult {
            url: result.url.clone(),
            title: result.title.clone(),
            snippet: result.snippet.clone(),
            content: result.snippet.clone(),
            serper_position: result.position,
            basin_distance: basin_distance(query_basin, &content_basin),
            hybrid_score: 0.0,
        }
    }
}

/// Fetch one page and score it against the query basin.
///
/// Every error path lands on the snippet fallback - a provider result always
/// produces a hybrid result.
async fn fetch_and_encode(
    fetcher: &PageFetcher,
    encoder: &BasinEncoder,
    query_basin: &[f32],
    result: ProviderResult,
    excerpt_len: usize,
) -> HybridResult {
    let (content, basin) = match fetcher.fetch_page(&result.url).await {
        Ok(page) => {
            let basin = encoder.encode(&page.text);
            (truncate_chars(&page.text, excerpt_len), basin)
        }
        Err(e) => {
            debug!(url = %result.url, error = %e, "page fetch failed, using snippet");
            (result.snippet.clone(), encoder.encode(&result.snippet))
        }
    };

    HybridResult {
        url: result.url,
        title: result.title,
        snippet: result.snippet,
        content,
        serper_position: result.position,
        basin_distance: basin_distance(query_basin, &basin),
        hybrid_score: 0.0,
    }
}

/// Normalize both ranking inputs to `[0, 1]` across the batch and blend.
///
/// Non-finite distances (zero-norm content basins) normalize to the cap so
/// they rank behind every finite distance instead of poisoning the batch.
fn score_results(results: &mut [HybridResult], alpha: f64) {
    let max_pos = results
        .iter()
        .map(|r| r.serper_position)
        .max()
        .unwrap_or(1)
        .max(1) as f64;

    let max_dist = results
        .iter()
        .map(|r| r.basin_distance)
        .filter(|d| d.is_finite())
        .fold(0.0f64, f64::max);
    let max_dist = if max_dist > 0.0 { max_dist } else { 1.0 };

    for r in results {
        let pos_score = r.serper_position as f64 / max_pos;
        let dist_score = if r.basin_distance.is_finite() {
            r.basin_distance / max_dist
        } else {
            1.0
        };
        r.hybrid_score = alpha * pos_score + (1.0 - alpha) * dist_score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(position: usize, distance: f64) -> HybridResult {
        HybridResult {
            url: format!("https://example.com/{position}"),
            title: String::new(),
            snippet: String::new(),
            content: String::new(),
            serper_position: position,
            basin_distance: distance,
            hybrid_score: 0.0,
        }
    }

    #[test]
    fn test_alpha_one_follows_provider_order() {
        let mut results = vec![
            make_result(1, 0.9),
            make_result(2, 0.1),
            make_result(3, 0.5),
        ];
        score_results(&mut results, 1.0);
        results.sort_by(|a, b| a.hybrid_score.total_cmp(&b.hybrid_score));
        let positions: Vec<usize> = results.iter().map(|r| r.serper_position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn test_alpha_zero_follows_distance_order() {
        let mut results = vec![
            make_result(1, 0.9),
            make_result(2, 0.1),
            make_result(3, 0.5),
        ];
        score_results(&mut results, 0.0);
        results.sort_by(|a, b| a.hybrid_score.total_cmp(&b.hybrid_score));
        let positions: Vec<usize> = results.iter().map(|r| r.serper_position).collect();
        assert_eq!(positions, vec![2, 3, 1]);
    }

    #[test]
    fn test_infinite_distance_ranks_last_not_nan() {
        let mut results = vec![
            make_result(1, f64::INFINITY),
            make_result(2, 0.3),
        ];
        score_results(&mut results, 0.5);
        assert!(results.iter().all(|r| r.hybrid_score.is_finite()));
        results.sort_by(|a, b| a.hybrid_score.total_cmp(&b.hybrid_score));
        assert_eq!(results[0].serper_position, 2);
    }

    #[test]
    fn test_zero_max_distance_does_not_divide_by_zero() {
        let mut results = vec![make_result(1, 0.0), make_result(2, 0.0)];
        score_results(&mut results, 0.0);
        assert!(results.iter().all(|r| r.hybrid_score == 0.0));
    }
}
