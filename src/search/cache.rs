//! LRU caching layer for hybrid search results
//!
//! Keys are hashes of (query, limit, alpha). All operations use try-lock:
//! a contended cache degrades to a miss rather than blocking a search.

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Instant;

use lru::LruCache;

use crate::search::hybrid::HybridResult;

/// Default number of cached queries
const DEFAULT_CACHE_SIZE: usize = 128;

/// Cached entry with bookkeeping
#[derive(Debug, Clone)]
pub struct CachedQuery {
    /// The hybrid results as returned to the caller
    pub results: Vec<HybridResult>,
    /// When this entry was stored
    pub cached_at: Instant,
    /// Times this entry was served
    pub hit_count: u64,
}

/// Hit/miss counters
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Lookups that found a live entry
    pub hits: u64,
    /// Lookups that found nothing (or lost the lock race)
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups served from cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe LRU cache for hybrid search results
pub struct SearchCache {
    entries: Mutex<LruCache<u64, CachedQuery>>,
    stats: Mutex<CacheStats>,
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

impl SearchCache {
    /// Create a cache holding up to `size` queries
    pub fn new(size: usize) -> Self {
        let size = NonZeroUsize::new(size.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(size)),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    fn key(query: &str, limit: usize, alpha: f64) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        query.hash(&mut hasher);
        limit.hash(&mut hasher);
        alpha.to_bits().hash(&mut hasher);
        hasher.finish()
    }

    /// Look up cached results. Returns None on miss or lock contention.
    pub fn get(&self, query: &str, limit: usize, alpha: f64) -> Option<Vec<HybridResult>> {
        let key = Self::key(query, limit, alpha);
        let mut entries = self.entries.try_lock().ok()?;
        let mut stats = self.stats.try_lock().ok()?;

        if let Some(entry) = entries.get_mut(&key) {
            entry.hit_count += 1;
            stats.hits += 1;
            Some(entry.results.clone())
        } else {
            stats.misses += 1;
            None
        }
    }

    /// Store results. Silently skipped on lock contention.
    pub fn put(&self, query: &str, limit: usize, alpha: f64, results: Vec<HybridResult>) {
        let key = Self::key(query, limit, alpha);
        if let Ok(mut entries) = self.entries.try_lock() {
            entries.put(
                key,
                CachedQuery {
                    results,
                    cached_at: Instant::now(),
                    hit_count: 0,
                },
            );
        }
    }

    /// Snapshot of the hit/miss counters
    pub fn stats(&self) -> CacheStats {
        self.stats.try_lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.try_lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries and reset counters
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.try_lock() {
            entries.clear();
        }
        if let Ok(mut stats) = self.stats.try_lock() {
            *stats = CacheStats::default();
        }
    }
}
