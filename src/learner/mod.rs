//! Continuous learning service
//!
//! Accepts URLs discovered during searches, queues them by priority, and
//! crawls them from a single background task: fetch, extract, encode,
//! persist. Newly indexed documents feed every subsequent basin search.
//!
//! Persistence here is idempotent-skip (`insert_if_absent`): re-crawling a
//! known document leaves it untouched. The overwrite path belongs to the
//! external re-crawl pipeline, not the learner.

pub mod queue;

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::core::encoding::BasinEncoder;
use crate::core::geometry::{DEFAULT_EPS, measure_phi};
use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::index::document::{Document, doc_id_for_url};
use crate::index::store::DocumentStore;
use crate::learner::queue::{CrawlQueue, CrawlTask};
use crate::search::hybrid::HybridResult;

/// Source tag for URLs discovered via hybrid search
const HYBRID_SOURCE: &str = "hybrid_search";

/// Construction parameters for the learner
#[derive(Debug, Clone)]
pub struct LearnerOptions {
    /// Maximum queued tasks before lowest-priority eviction
    pub queue_capacity: usize,
    /// Capacity of the seen-URL set
    pub seen_capacity: usize,
    /// Pause between dispatched tasks (the rate limiter)
    pub crawl_delay: Duration,
    /// Extracted text shorter than this is discarded, not indexed
    pub min_content_len: usize,
}

impl Default for LearnerOptions {
    fn default() -> Self {
        Self {
            queue_capacity: 1000,
            seen_capacity: 16_000,
            crawl_delay: Duration::from_secs(1),
            min_content_len: 100,
        }
    }
}

/// Snapshot of learner counters plus live queue state
#[derive(Debug, Clone, Default, Serialize)]
pub struct LearningStats {
    /// URLs accepted into the queue
    pub urls_queued: u64,
    /// Tasks dispatched to completion (indexed, skipped, or too short)
    pub urls_crawled: u64,
    /// Tasks that raised during fetch/parse/persist
    pub urls_failed: u64,
    /// New documents persisted
    pub documents_added: u64,
    /// Completion time of the most recent crawl
    pub last_crawl_time: Option<DateTime<Utc>>,
    /// Tasks currently waiting
    pub queue_size: usize,
    /// Whether the dispatch loop is running
    pub running: bool,
}

#[derive(Debug, Clone, Default)]
struct Counters {
    urls_queued: u64,
    urls_crawled: u64,
    urls_failed: u64,
    documents_added: u64,
    last_crawl_time: Option<DateTime<Utc>>,
}

struct Inner {
    store: Arc<DocumentStore>,
    fetcher: Arc<PageFetcher>,
    encoder: BasinEncoder,
    crawl_delay: Duration,
    min_content_len: usize,
    queue: Mutex<CrawlQueue>,
    seen: Mutex<LruCache<u64, ()>>,
    counters: Mutex<Counters>,
    running: AtomicBool,
}

/// Background crawl-and-learn service.
///
/// Construct one per process, share it behind an `Arc`, and call `stop`
/// during shutdown. There is no ambient singleton.
pub struct ContinuousLearner {
    inner: Arc<Inner>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ContinuousLearner {
    /// Create a learner over the given store and fetcher
    pub fn new(
        store: Arc<DocumentStore>,
        fetcher: Arc<PageFetcher>,
        encoder: BasinEncoder,
        options: &LearnerOptions,
    ) -> Self {
        let seen_capacity = NonZeroUsize::new(options.seen_capacity.max(1))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(Inner {
                store,
                fetcher,
                encoder,
                crawl_delay: options.crawl_delay,
                min_content_len: options.min_content_len,
                queue: Mutex::new(CrawlQueue::new(options.queue_capacity)),
                seen: Mutex::new(LruCache::new(seen_capacity)),
                counters: Mutex::new(Counters::default()),
                running: AtomicBool::new(false),
            }),
            handle: Mutex::new(None),
        }
    }

    /// Queue a URL for background crawling.
    ///
    /// Returns false (and changes nothing) when the URL was already seen.
    /// A full queue evicts its lowest-priority task to make room.
    pub fn enqueue(&self, url: &str, priority: i64, source: &str) -> bool {
        let key = url_seen_key(url);
        {
            let mut seen = self.inner.seen.lock();
            if seen.contains(&key) {
                return false;
            }
            seen.put(key, ());
        }

        let evicted = self.inner.queue.lock().push(CrawlTask {
            url: url.to_string(),
            priority,
            source: source.to_string(),
            created_at: Utc::now(),
        });
        if let Some(evicted) = evicted {
            debug!(url = %evicted.url, priority = evicted.priority, "queue full, evicted lowest-priority task");
        }

        self.inner.counters.lock().urls_queued += 1;
        debug!(url, priority, source, "queued url");
        true
    }

    /// Queue every URL from a hybrid result list.
    ///
    /// Earlier results get higher priority (inverse position). Returns how
    /// many URLs were actually accepted.
    pub fn enqueue_hybrid_results(&self, results: &[HybridResult]) -> usize {
        let total = results.len();
        results
            .iter()
            .enumerate()
            .filter(|(i, r)| self.enqueue(&r.url, (total - i) as i64, HYBRID_SOURCE))
            .count()
    }

    /// Start the dispatch loop. No-op if already running.
    pub fn start(&self) {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            dispatch_loop(inner).await;
        });
        *self.handle.lock() = Some(handle);
        info!("continuous learner started");
    }

    /// Stop the dispatch loop and wait for it to wind down.
    ///
    /// After this returns no dispatch is in flight and stats no longer
    /// change (an in-progress fetch is interrupted by cancellation).
    pub async fn stop(&self) {
        self.inner.running.store(false, Ordering::SeqCst);
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }
        info!("continuous learner stopped");
    }

    /// Whether the dispatch loop is running
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Snapshot the learner's counters and queue state
    pub fn stats(&self) -> LearningStats {
        let counters = self.inner.counters.lock().clone();
        LearningStats {
            urls_queued: counters.urls_queued,
            urls_crawled: counters.urls_crawled,
            urls_failed: counters.urls_failed,
            documents_added: counters.documents_added,
            last_crawl_time: counters.last_crawl_time,
            queue_size: self.inner.queue.lock().len(),
            running: self.is_running(),
        }
    }
}

/// Single-worker dispatch loop: pop, crawl, count, pause.
///
/// A task failure increments a counter and the loop moves on; nothing short
/// of `stop` ends it. The crawl-delay sleep doubles as the rate limiter and
/// the idle wait.
async fn dispatch_loop(inner: Arc<Inner>) {
    while inner.running.load(Ordering::SeqCst) {
        let task = inner.queue.lock().pop();
        let Some(task) = task else {
            sleep(inner.crawl_delay).await;
            continue;
        };

        match crawl_and_index(&inner, &task).await {
            Ok(added) => {
                let mut counters = inner.counters.lock();
                counters.urls_crawled += 1;
                counters.last_crawl_time = Some(Utc::now());
                if added {
                    counters.documents_added += 1;
                }
            }
            Err(e) => {
                warn!(url = %task.url, error = %e, "crawl failed");
                inner.counters.lock().urls_failed += 1;
            }
        }

        sleep(inner.crawl_delay).await;
    }
}

/// Fetch one URL and persist it as a new document.
///
/// Returns whether a document was added: pages with too little content and
/// already-indexed doc ids complete successfully without adding anything.
async fn crawl_and_index(inner: &Inner, task: &CrawlTask) -> Result<bool> {
    let page = inner.fetcher.fetch_page(&task.url).await?;

    if page.text.chars().count() < inner.min_content_len {
        debug!(url = %task.url, "content too short, skipping");
        return Ok(false);
    }

    let basin = inner.encoder.encode(&page.text);
    let phi = measure_phi(&basin, DEFAULT_EPS);
    let doc = Document {
        doc_id: doc_id_for_url(&task.url),
        url: task.url.clone(),
        title: page.title,
        text: page.text,
        basin,
        phi,
    };

    let added = inner.store.insert_if_absent(&doc)?;
    if added {
        info!(url = %task.url, phi, "indexed new document");
    } else {
        debug!(url = %task.url, "document already indexed");
    }
    Ok(added)
}

/// Compact seen-set key: leading 64 bits of the URL's SHA-256 digest
fn url_seen_key(url: &str) -> u64 {
    let digest = Sha256::digest(url.as_bytes());
    u64::from_le_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ])
}
