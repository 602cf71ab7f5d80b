//! Basin geometry core: text encoding and distance measurements
//!
//! Everything here is pure computation - no IO, no shared state. The encoder
//! turns text into fixed-dimension "basin" vectors; the geometry functions
//! measure distances and scalar properties over those vectors.

pub mod encoding;
pub mod geometry;

pub use encoding::{BASIN_DIM, BasinEncoder};
pub use geometry::{
    DEFAULT_EPS, KAPPA_STAR, basin_distance, fisher_rao_distance, measure_kappa, measure_phi,
};
