//! Crate error type and `Result` alias.
//!
//! A single `thiserror` enum (`BasinError`) covers every failure the library
//! surfaces. Input errors (Fisher-Rao shape mismatch) and fetch failures are
//! dedicated variants; foreign errors from the storage, serialization, IO and
//! HTTP layers are carried via `#[from]` conversions so `?` works throughout.
//! Degenerate numeric conditions are NOT errors — they resolve to fallback
//! values locally (spec §7).

use thiserror::Error;

/// The crate-wide error type.
#[derive(Debug, Error)]
pub enum BasinError {
    /// Two basin vectors had incompatible shapes for a geometry operation.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A page fetch could not be completed (bad url, scheme, content type).
    #[error("fetch error: {0}")]
    Fetch(String),

    /// An error originating in the SQLite storage layer.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// A JSON (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// An underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An HTTP client error.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BasinError>;
