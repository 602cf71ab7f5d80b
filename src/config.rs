//! Runtime configuration
//!
//! Defaults first, `BASIN_*` environment overrides second. Invalid override
//! values are logged and ignored rather than aborting startup.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::encoding::BASIN_DIM;
use crate::learner::LearnerOptions;
use crate::search::hybrid::HybridOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database location
    pub db_path: PathBuf,
    /// Basin vector dimension
    pub basin_dim: usize,
    /// Serper API key; absent means web search is disabled
    pub serper_api_key: Option<String>,
    /// Provider result country
    pub country: String,
    /// Provider result language
    pub language: String,
    /// Fetch page content during hybrid search (false = snippets only)
    pub fetch_content: bool,
    /// Maximum provider results fetched per hybrid call
    pub max_fetch: usize,
    /// Concurrent page fetches during hybrid search
    pub fetch_concurrency: usize,
    /// Per-request fetch timeout in seconds
    pub fetch_timeout_secs: u64,
    /// Stored/encoded text cap in characters
    pub max_text_len: usize,
    /// Hybrid result content excerpt cap in characters
    pub excerpt_len: usize,
    /// Minimum extracted length worth indexing
    pub min_content_len: usize,
    /// Crawl queue capacity
    pub queue_capacity: usize,
    /// Seen-URL set capacity
    pub seen_capacity: usize,
    /// Delay between crawled pages in milliseconds
    pub crawl_delay_ms: u64,
    /// Query-result cache size
    pub cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("data/basinsearch.db"),
            basin_dim: BASIN_DIM,
            serper_api_key: None,
            country: "us".to_string(),
            language: "en".to_string(),
            fetch_content: true,
            max_fetch: 10,
            fetch_concurrency: 8,
            fetch_timeout_secs: 10,
            max_text_len: 5000,
            excerpt_len: 500,
            min_content_len: 100,
            queue_capacity: 1000,
            seen_capacity: 16_000,
            crawl_delay_ms: 1000,
            cache_size: 128,
        }
    }
}

impl Config {
    /// Defaults overlaid with environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("BASIN_DB_PATH") {
            self.db_path = PathBuf::from(path);
        }
        if let Ok(key) = std::env::var("SERPER_API_KEY") {
            if !key.is_empty() {
                self.serper_api_key = Some(key);
            }
        }
        if let Some(v) = env_parse("BASIN_DIM") {
            self.basin_dim = v;
        }
        if let Some(v) = env_parse("BASIN_MAX_FETCH") {
            self.max_fetch = v;
        }
        if let Some(v) = env_parse("BASIN_FETCH_CONCURRENCY") {
            self.fetch_concurrency = v;
        }
        if let Some(v) = env_parse("BASIN_FETCH_TIMEOUT_SECS") {
            self.fetch_timeout_secs = v;
        }
        if let Some(v) = env_parse("BASIN_QUEUE_CAPACITY") {
            self.queue_capacity = v;
        }
        if let Some(v) = env_parse("BASIN_CRAWL_DELAY_MS") {
            self.crawl_delay_ms = v;
        }
        if let Some(v) = env_parse("BASIN_MIN_CONTENT_LEN") {
            self.min_content_len = v;
        }
        if let Some(v) = env_parse("BASIN_CACHE_SIZE") {
            self.cache_size = v;
        }
        if let Some(v) = env_parse("BASIN_FETCH_CONTENT") {
            self.fetch_content = v;
        }
    }

    /// Fetch timeout as a duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Learner options derived from this config
    pub fn learner_options(&self) -> LearnerOptions {
        LearnerOptions {
            queue_capacity: self.queue_capacity,
            seen_capacity: self.seen_capacity,
            crawl_delay: Duration::from_millis(self.crawl_delay_ms),
            min_content_len: self.min_content_len,
        }
    }

    /// Hybrid search options derived from this config
    pub fn hybrid_options(&self) -> HybridOptions {
        HybridOptions {
            fetch_content: self.fetch_content,
            max_fetch: self.max_fetch,
            fetch_concurrency: self.fetch_concurrency,
            excerpt_len: self.excerpt_len,
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable env override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.basin_dim, 64);
        assert_eq!(config.max_fetch, 10);
        assert_eq!(config.queue_capacity, 1000);
        assert_eq!(config.crawl_delay_ms, 1000);
        assert_eq!(config.min_content_len, 100);
        assert_eq!(config.max_text_len, 5000);
        assert_eq!(config.excerpt_len, 500);
    }

    #[test]
    fn test_derived_option_structs() {
        let config = Config::default();
        let learner = config.learner_options();
        assert_eq!(learner.queue_capacity, 1000);
        assert_eq!(learner.crawl_delay, Duration::from_secs(1));

        let hybrid = config.hybrid_options();
        assert!(hybrid.fetch_content);
        assert_eq!(hybrid.max_fetch, 10);
    }
}
