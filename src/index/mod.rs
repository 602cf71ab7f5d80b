//! Document persistence and the linear basin index

pub mod basin_index;
pub mod document;
pub mod store;

pub use basin_index::{BasinIndex, SearchHit};
pub use document::{Document, doc_id_for_url};
pub use store::DocumentStore;
