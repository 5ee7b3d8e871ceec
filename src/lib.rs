// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod assistant;
pub mod config;
pub mod enrich;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod service;
pub mod snapshot;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::PipelineConfig;
pub use crate::enrich::{EnrichedHeadline, Sentiment};
pub use crate::error::{EnrichError, FetchError};
pub use crate::service::NewsService;
pub use crate::snapshot::Snapshot;
