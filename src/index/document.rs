//! Persisted document model

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A crawled, encoded document.
///
/// `doc_id` is derived from the URL and stable across re-crawls; `basin` is
/// the encoded content vector and `phi` its integration score at index time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier: truncated hex digest of the URL
    pub doc_id: String,
    /// Source URL, unique across the store
    pub url: String,
    /// Page title, possibly empty
    pub title: String,
    /// Extracted text, truncated at index time
    pub text: String,
    /// Basin vector of the text
    pub basin: Vec<f32>,
    /// Integration score of the basin
    pub phi: f64,
}

/// Derive the stable document id for a URL: SHA-256 hex digest truncated to
/// 16 characters.
pub fn doc_id_for_url(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(16);
    id
}
