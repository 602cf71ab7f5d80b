//! basinsearch - geometric web search with continuous learning
//!
//! The core pipeline: a deterministic hash encoder maps text to "basin"
//! vectors, geometry functions measure distances over them, a linear index
//! ranks stored documents, a hybrid orchestrator blends web-provider rank
//! with geometric distance, and a background learner crawls discovered URLs
//! into the store so every search makes the next one better.

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod fetch;
pub mod index;
pub mod learner;
pub mod search;

pub use app::AppContext;
pub use config::Config;
pub use error::{BasinError, Result};
