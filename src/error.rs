use thiserror::Error;

/// Errors raised by a single upstream headline fetch.
///
/// The aggregator treats every variant the same way (log, retry, move on) —
/// the distinction exists for diagnostics, not for control flow.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// NewsAPI answered with `"status" != "ok"`.
    #[error("newsapi error ({code}): {message}")]
    Api { code: String, message: String },

    /// The response body carried no recognizable article list.
    #[error("response missing article list")]
    MissingArticles,
}

/// Per-headline enrichment failure. Isolated to one record; the batch continues
/// with that record labeled `Error`.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("input too long for polarity model: {len} chars (max {max})")]
    InputTooLong { len: usize, max: usize },

    #[error("polarity model failure: {0}")]
    Model(String),
}
