//! # Snapshot Service
//! The boundary the HTTP layer calls: run the ingestion/enrichment pipeline,
//! keep the latest snapshot cached, refresh lazily on a cold read.

use metrics::{counter, gauge};
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::enrich::polarity::PolarityPass;
use crate::enrich::vader::VaderAnalyzer;
use crate::enrich::{seed_batch, SentimentPass};
use crate::ingest::{self, types::HeadlineSource};
use crate::snapshot::{Snapshot, SnapshotCache};

pub struct NewsService {
    source: Arc<dyn HeadlineSource>,
    passes: Vec<Box<dyn SentimentPass>>,
    cfg: PipelineConfig,
    cache: SnapshotCache,
    /// Serializes pipeline runs; concurrent refreshes queue instead of
    /// interleaving writes.
    refresh_gate: tokio::sync::Mutex<()>,
}

impl NewsService {
    /// Service with the standard two enrichment passes.
    pub fn new(source: Arc<dyn HeadlineSource>, cfg: PipelineConfig) -> Self {
        Self::with_passes(
            source,
            cfg,
            vec![
                Box::new(VaderAnalyzer::new()),
                Box::new(PolarityPass::default()),
            ],
        )
    }

    pub fn with_passes(
        source: Arc<dyn HeadlineSource>,
        cfg: PipelineConfig,
        passes: Vec<Box<dyn SentimentPass>>,
    ) -> Self {
        Self {
            source,
            passes,
            cfg,
            cache: SnapshotCache::new(),
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Run the full pipeline once: aggregate, annotate, install.
    ///
    /// A run that produced no headlines leaves the previous snapshot untouched
    /// and returns it (or `None` if there never was one) — a failed refresh
    /// never destroys a valid cache.
    pub async fn refresh(&self) -> Option<Arc<Snapshot>> {
        let _gate = self.refresh_gate.lock().await;

        counter!("snapshot_refresh_total").increment(1);
        let headlines = ingest::aggregate_headlines(self.source.as_ref(), &self.cfg).await;

        if headlines.is_empty() {
            counter!("snapshot_refresh_empty_total").increment(1);
            tracing::warn!("refresh produced no headlines, keeping previous snapshot");
            return self.cache.current();
        }

        let mut batch = seed_batch(headlines);
        for pass in &self.passes {
            tracing::debug!(pass = pass.name(), records = batch.len(), "annotating batch");
            pass.annotate(&mut batch);
        }

        let snap = self.cache.install(batch);
        gauge!("snapshot_headlines").set(snap.records.len() as f64);
        gauge!("snapshot_last_refresh_ts").set(snap.as_of_unix as f64);
        tracing::info!(
            generation = snap.generation,
            headlines = snap.records.len(),
            "snapshot refreshed"
        );
        Some(snap)
    }

    /// Latest snapshot. A cold cache triggers exactly one synchronous refresh
    /// and returns its outcome, which may still be "no data".
    pub async fn latest(&self) -> Option<Arc<Snapshot>> {
        if let Some(snap) = self.cache.current() {
            return Some(snap);
        }
        tracing::info!("no cached snapshot, refreshing now");
        self.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::Sentiment;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    fn test_cfg() -> PipelineConfig {
        PipelineConfig {
            sources: vec!["bbc-news".to_string()],
            backoff_secs: 0,
            ..PipelineConfig::default()
        }
    }

    /// Replays one scripted response batch per `top_headlines` call, then
    /// keeps answering with an empty list. Fallback always yields nothing.
    struct ScriptedSource {
        script: Mutex<VecDeque<Vec<String>>>,
        calls: AtomicU32,
    }

    impl ScriptedSource {
        fn new(script: Vec<Vec<&str>>) -> Self {
            Self {
                script: Mutex::new(
                    script
                        .into_iter()
                        .map(|batch| batch.into_iter().map(str::to_string).collect())
                        .collect(),
                ),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl HeadlineSource for ScriptedSource {
        async fn top_headlines(&self, _source: &str) -> Result<Vec<String>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default())
        }

        async fn category_headlines(
            &self,
            _category: &str,
            _country: &str,
        ) -> Result<Vec<String>, FetchError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn refresh_installs_an_annotated_snapshot() {
        let source = Arc::new(ScriptedSource::new(vec![vec![
            "Stocks rally on strong earnings",
            "Market crashes amid fears",
        ]]));
        let service = NewsService::new(source, test_cfg());

        let snap = service.refresh().await.expect("snapshot installed");
        assert_eq!(snap.generation, 1);
        assert_eq!(snap.records.len(), 2);
        assert_eq!(snap.records[0].vader_label, Sentiment::Positive);
        assert_eq!(snap.records[1].vader_label, Sentiment::Negative);
        assert_eq!(snap.records[0].textblob_label, Sentiment::Positive);
        assert_eq!(snap.records[1].textblob_label, Sentiment::Negative);
    }

    #[tokio::test]
    async fn empty_refresh_keeps_the_previous_snapshot() {
        // First run yields headlines; every later run yields nothing.
        let source = Arc::new(ScriptedSource::new(vec![vec!["Profits surge"]]));
        let service = NewsService::new(source, test_cfg());

        let first = service.refresh().await.expect("first refresh installs");
        assert_eq!(first.generation, 1);

        let second = service.refresh().await.expect("previous snapshot survives");
        assert_eq!(second.generation, 1, "empty refresh must not replace");
        assert_eq!(second.records[0].headline, "Profits surge");
    }

    #[tokio::test]
    async fn empty_refresh_on_a_cold_cache_stays_empty() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let service = NewsService::new(source, test_cfg());
        assert!(service.refresh().await.is_none());
    }

    #[tokio::test]
    async fn cold_read_refreshes_exactly_once_then_serves_the_cache() {
        let source = Arc::new(ScriptedSource::new(vec![vec!["Banks rebound"]]));
        let calls = Arc::clone(&source);
        let service = NewsService::new(source, test_cfg());

        let first = service.latest().await.expect("cold read refreshes");
        assert_eq!(first.generation, 1);
        assert_eq!(calls.calls.load(Ordering::SeqCst), 1);

        let second = service.latest().await.expect("warm read hits the cache");
        assert_eq!(second.generation, 1);
        assert_eq!(
            calls.calls.load(Ordering::SeqCst),
            1,
            "warm reads must not touch upstream"
        );
    }
}
