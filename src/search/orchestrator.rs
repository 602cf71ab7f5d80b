//! Local search over the document store

use std::sync::Arc;

use serde::Serialize;

use crate::core::encoding::BasinEncoder;
use crate::error::Result;
use crate::fetch::truncate_chars;
use crate::index::basin_index::BasinIndex;
use crate::index::store::DocumentStore;

/// Snippet length for display
const SNIPPET_LEN: usize = 220;

/// A ranked local search result
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// Matched document id
    pub doc_id: String,
    /// Source URL
    pub url: String,
    /// Page title
    pub title: String,
    /// Leading slice of the stored text
    pub snippet: String,
    /// Angular distance to the query (lower is more similar)
    pub distance: f64,
}

/// Composes encoder, basin index, and store into ranked local search
pub struct SearchOrchestrator {
    store: Arc<DocumentStore>,
    index: BasinIndex,
    encoder: BasinEncoder,
}

impl SearchOrchestrator {
    /// Build an orchestrator over the given store
    pub fn new(store: Arc<DocumentStore>, encoder: BasinEncoder) -> Self {
        let index = BasinIndex::new(Arc::clone(&store));
        Self { store, index, encoder }
    }

    /// Search stored documents for `query`, best matches first.
    ///
    /// Hits whose documents vanished between ranking and hydration are
    /// skipped rather than reported; callers always get a well-formed list.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let query_basin = self.encoder.encode(query);
        let hits = self.index.search(&query_basin, limit)?;

        let ids: Vec<String> = hits.iter().map(|h| h.doc_id.clone()).collect();
        let by_id = self.store.get_documents_by_ids(&ids)?;

        let mut out = Vec::with_capacity(hits.len());
        for hit in hits {
            let Some(doc) = by_id.get(&hit.doc_id) else {
                continue;
            };
            out.push(SearchResult {
                doc_id: doc.doc_id.clone(),
                url: doc.url.clone(),
                title: doc.title.clone(),
                snippet: truncate_chars(&doc.text, SNIPPET_LEN),
                distance: hit.distance,
            });
        }
        Ok(out)
    }
}
