// src/ingest/types.rs
use crate::error::FetchError;

/// Upstream headline source. One outbound request per call; every transport,
/// status, or response-shape failure collapses into [`FetchError`].
#[async_trait::async_trait]
pub trait HeadlineSource: Send + Sync {
    /// Top headlines for one configured source identifier (e.g. "bbc-news").
    async fn top_headlines(&self, source: &str) -> Result<Vec<String>, FetchError>;

    /// Broader category query, used once as a fallback when every configured
    /// source came up empty.
    async fn category_headlines(
        &self,
        category: &str,
        country: &str,
    ) -> Result<Vec<String>, FetchError>;
}
