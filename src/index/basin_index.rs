//! Linear basin index
//!
//! Brute-force scan over the full document set, no pre-built spatial
//! structure. O(N) per query, fast enough while the store stays small.
//! Callers that outgrow it should put an ANN structure in front without
//! changing the hit contract.

use std::sync::Arc;

use crate::core::geometry::basin_distance;
use crate::error::Result;
use crate::index::store::DocumentStore;

/// One scored index hit
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Matched document id
    pub doc_id: String,
    /// Angular distance to the query basin (lower is more similar)
    pub distance: f64,
}

/// Distance-ranked view over the document store
pub struct BasinIndex {
    store: Arc<DocumentStore>,
}

impl BasinIndex {
    /// Create an index over the given store
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Rank all stored documents by distance to `query_basin`, ascending.
    ///
    /// Ties keep storage order (stable sort). Output length is at most
    /// `limit`.
    pub fn search(&self, query_basin: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
        let docs = self.store.all_documents()?;

        let mut hits: Vec<SearchHit> = docs
            .iter()
            .map(|d| SearchHit {
                doc_id: d.doc_id.clone(),
                distance: basin_distance(query_basin, &d.basin),
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(limit);
        Ok(hits)
    }
}
