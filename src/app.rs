//! Application context: config in, owned services out
//!
//! All long-lived services are constructed here and owned by the context -
//! there are no process-global instances. `shutdown` is the single place
//! that winds the background learner down.

use std::sync::Arc;

use crate::config::Config;
use crate::core::encoding::BasinEncoder;
use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::index::store::DocumentStore;
use crate::learner::ContinuousLearner;
use crate::search::cache::SearchCache;
use crate::search::hybrid::HybridSearch;
use crate::search::orchestrator::SearchOrchestrator;
use crate::search::provider::SerperClient;

/// Owned service graph for one process
pub struct AppContext {
    pub config: Config,
    pub store: Arc<DocumentStore>,
    pub encoder: BasinEncoder,
    pub fetcher: Arc<PageFetcher>,
    pub cache: Arc<SearchCache>,
    pub orchestrator: SearchOrchestrator,
    pub hybrid: HybridSearch,
    pub learner: Arc<ContinuousLearner>,
}

impl AppContext {
    /// Wire up every service from a config
    pub fn from_config(config: Config) -> Result<Self> {
        let store = Arc::new(DocumentStore::open(&config.db_path)?);
        let encoder = BasinEncoder::new(config.basin_dim);
        let fetcher = Arc::new(PageFetcher::new(config.fetch_timeout(), config.max_text_len)?);

        let provider = SerperClient::new(config.serper_api_key.clone())
            .with_locale(config.country.clone(), config.language.clone());

        let orchestrator = SearchOrchestrator::new(Arc::clone(&store), encoder.clone());
        let hybrid = HybridSearch::new(
            provider,
            Arc::clone(&fetcher),
            encoder.clone(),
            config.hybrid_options(),
        );
        let learner = Arc::new(ContinuousLearner::new(
            Arc::clone(&store),
            Arc::clone(&fetcher),
            encoder.clone(),
            &config.learner_options(),
        ));
        let cache = Arc::new(SearchCache::new(config.cache_size));

        Ok(Self {
            config,
            store,
            encoder,
            fetcher,
            cache,
            orchestrator,
            hybrid,
            learner,
        })
    }

    /// Stop background work. Safe to call more than once.
    pub async fn shutdown(&self) {
        self.learner.stop().await;
    }
}
