// src/ingest/mod.rs
pub mod newsapi;
pub mod scheduler;
pub mod types;

use metrics::{counter, describe_counter, describe_gauge};
use once_cell::sync::OnceCell;
use std::time::Duration;

use crate::config::PipelineConfig;
use crate::ingest::types::HeadlineSource;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("news_fetch_attempts_total", "Upstream fetch attempts.");
        describe_counter!(
            "news_fetch_errors_total",
            "Upstream fetch attempts that failed."
        );
        describe_counter!(
            "news_fallback_total",
            "Fallback category queries issued after all sources came up empty."
        );
        describe_counter!(
            "news_headlines_total",
            "Headlines kept after normalization + empty filtering."
        );
        describe_counter!("snapshot_refresh_total", "Pipeline refresh runs.");
        describe_counter!(
            "snapshot_refresh_empty_total",
            "Refresh runs that produced nothing and left the cache untouched."
        );
        describe_counter!(
            "snapshot_scheduled_refresh_total",
            "Refreshes triggered by the interval scheduler."
        );
        describe_gauge!("snapshot_headlines", "Headline count in the current snapshot.");
        describe_gauge!(
            "snapshot_last_refresh_ts",
            "Unix ts of the last successful snapshot install."
        );
    });
}

/// Normalize an upstream title: HTML entity decode, collapse whitespace, trim.
pub fn normalize_title(s: &str) -> String {
    let out = html_escape::decode_html_entities(s).to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Linear backoff: `backoff_secs * attempt`, so factor 2 yields 2s, 4s, 6s…
pub(crate) fn backoff_delay(backoff_secs: u64, attempt: u32) -> Duration {
    Duration::from_secs(backoff_secs.saturating_mul(u64::from(attempt)))
}

/// Fetch headlines from every configured source. Total: returns an empty list
/// on total failure and lets the caller decide what that means.
///
/// Per source: up to `cfg.max_retries` attempts with a backoff sleep between
/// attempts; the first success ends retrying for that source and its
/// empty-filtered titles join the running collection. A fully failed source
/// never blocks the ones after it. If nothing was collected at the end, a
/// single broader category query is issued and its titles become the result.
pub async fn aggregate_headlines(source: &dyn HeadlineSource, cfg: &PipelineConfig) -> Vec<String> {
    ensure_metrics_described();

    let mut collected: Vec<String> = Vec::new();

    for id in &cfg.sources {
        for attempt in 1..=cfg.max_retries {
            counter!("news_fetch_attempts_total").increment(1);
            tracing::info!(source = %id, attempt, "fetching top headlines");

            match source.top_headlines(id).await {
                Ok(titles) => {
                    let kept = push_titles(&mut collected, titles);
                    tracing::info!(source = %id, kept, "source fetch succeeded");
                    break;
                }
                Err(e) => {
                    counter!("news_fetch_errors_total").increment(1);
                    tracing::warn!(source = %id, attempt, error = %e, "fetch failed");
                    if attempt < cfg.max_retries {
                        tokio::time::sleep(backoff_delay(cfg.backoff_secs, attempt)).await;
                    }
                }
            }
        }
    }

    if collected.is_empty() {
        counter!("news_fallback_total").increment(1);
        tracing::info!(
            category = %cfg.fallback_category,
            country = %cfg.fallback_country,
            "no headlines from sources, falling back to category query"
        );
        match source
            .category_headlines(&cfg.fallback_category, &cfg.fallback_country)
            .await
        {
            Ok(titles) => {
                push_titles(&mut collected, titles);
            }
            Err(e) => tracing::error!(error = %e, "fallback fetch failed"),
        }
    }

    counter!("news_headlines_total").increment(collected.len() as u64);
    collected
}

/// Normalize, drop empties, append. Returns how many survived.
fn push_titles(collected: &mut Vec<String>, titles: Vec<String>) -> usize {
    let before = collected.len();
    collected.extend(
        titles
            .iter()
            .map(|t| normalize_title(t))
            .filter(|t| !t.is_empty()),
    );
    collected.len() - before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn test_cfg(sources: &[&str]) -> PipelineConfig {
        PipelineConfig {
            sources: sources.iter().map(|s| s.to_string()).collect(),
            backoff_secs: 0, // no real sleeping in tests
            ..PipelineConfig::default()
        }
    }

    fn api_err() -> FetchError {
        FetchError::Api {
            code: "serverError".to_string(),
            message: "boom".to_string(),
        }
    }

    /// Fails `failures` times per call sequence, then succeeds with `titles`.
    struct FlakySource {
        failures: u32,
        titles: Vec<String>,
        attempts: AtomicU32,
        fallback_calls: AtomicU32,
    }

    impl FlakySource {
        fn new(failures: u32, titles: &[&str]) -> Self {
            Self {
                failures,
                titles: titles.iter().map(|s| s.to_string()).collect(),
                attempts: AtomicU32::new(0),
                fallback_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl HeadlineSource for FlakySource {
        async fn top_headlines(&self, _source: &str) -> Result<Vec<String>, FetchError> {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.failures {
                Err(api_err())
            } else {
                Ok(self.titles.clone())
            }
        }

        async fn category_headlines(
            &self,
            _category: &str,
            _country: &str,
        ) -> Result<Vec<String>, FetchError> {
            self.fallback_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["Fallback business headline".to_string()])
        }
    }

    /// Every call fails; the fallback yields `fallback_titles`.
    struct DeadSource {
        attempts: AtomicU32,
        fallback_calls: AtomicU32,
        fallback_titles: Vec<String>,
    }

    impl DeadSource {
        fn new(fallback_titles: &[&str]) -> Self {
            Self {
                attempts: AtomicU32::new(0),
                fallback_calls: AtomicU32::new(0),
                fallback_titles: fallback_titles.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    #[async_trait]
    impl HeadlineSource for DeadSource {
        async fn top_headlines(&self, _source: &str) -> Result<Vec<String>, FetchError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(api_err())
        }

        async fn category_headlines(
            &self,
            _category: &str,
            _country: &str,
        ) -> Result<Vec<String>, FetchError> {
            self.fallback_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.fallback_titles.clone())
        }
    }

    #[tokio::test]
    async fn fails_twice_then_succeeds_in_exactly_three_attempts() {
        let src = FlakySource::new(2, &["Stocks rally on strong earnings"]);
        let cfg = test_cfg(&["bbc-news"]);

        let out = aggregate_headlines(&src, &cfg).await;

        assert_eq!(src.attempts.load(Ordering::SeqCst), 3);
        assert_eq!(out, vec!["Stocks rally on strong earnings"]);
        assert_eq!(
            src.fallback_calls.load(Ordering::SeqCst),
            0,
            "fallback must not fire when a source yielded"
        );
    }

    #[tokio::test]
    async fn exhausted_sources_trigger_exactly_one_fallback_call() {
        let src = DeadSource::new(&["Fed holds rates steady"]);
        let cfg = test_cfg(&["bbc-news", "cnn"]);

        let out = aggregate_headlines(&src, &cfg).await;

        // 2 sources x 3 retries
        assert_eq!(src.attempts.load(Ordering::SeqCst), 6);
        assert_eq!(src.fallback_calls.load(Ordering::SeqCst), 1);
        assert_eq!(out, vec!["Fed holds rates steady"]);
    }

    #[tokio::test]
    async fn empty_everywhere_is_a_valid_empty_result() {
        let src = DeadSource::new(&[]);
        let cfg = test_cfg(&["bbc-news"]);

        let out = aggregate_headlines(&src, &cfg).await;

        assert!(out.is_empty());
        assert_eq!(src.fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_titles_are_filtered_not_kept() {
        let src = FlakySource::new(0, &["", "  ", "Profits surge"]);
        let cfg = test_cfg(&["bbc-news"]);

        let out = aggregate_headlines(&src, &cfg).await;
        assert_eq!(out, vec!["Profits surge"]);
    }

    #[test]
    fn backoff_progression_is_linear_in_the_attempt_number() {
        assert_eq!(backoff_delay(2, 1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2, 2), Duration::from_secs(4));
        assert_eq!(backoff_delay(2, 3), Duration::from_secs(6));
        assert_eq!(backoff_delay(0, 7), Duration::ZERO);
    }

    #[test]
    fn normalize_title_decodes_and_collapses() {
        assert_eq!(
            normalize_title("  Markets&nbsp;&amp; more \n rally  "),
            "Markets & more rally"
        );
        assert_eq!(normalize_title("   "), "");
    }
}
