// src/config.rs
// Pipeline configuration: fixed defaults, env-var overrides, optional TOML
// sources file. The core components receive this struct ready-made; nothing
// below `main` reads the environment itself.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_SOURCES_PATH: &str = "NEWS_SOURCES_PATH";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upstream source identifiers, queried in order.
    pub sources: Vec<String>,
    /// Article language passed to every upstream query.
    pub language: String,
    /// Attempts per source before giving up on it.
    pub max_retries: u32,
    /// Linear backoff factor in seconds: sleep `backoff_secs * attempt` between
    /// attempts on the same source.
    pub backoff_secs: u64,
    /// Period of the background refresh.
    pub refresh_interval: Duration,
    /// Category for the single fallback query when every source came up empty.
    pub fallback_category: String,
    /// Locale for the fallback query.
    pub fallback_country: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sources: ["bbc-news", "cnn", "reuters", "business-insider"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            language: "en".to_string(),
            max_retries: 3,
            backoff_secs: 2,
            refresh_interval: Duration::from_secs(30 * 60),
            fallback_category: "business".to_string(),
            fallback_country: "us".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by environment variables where present:
    /// `NEWS_SOURCES` (comma-separated), `NEWS_SOURCES_PATH` (TOML file, wins
    /// over the comma list), `NEWS_LANGUAGE`, `NEWS_MAX_RETRIES`,
    /// `NEWS_BACKOFF_SECS`, `NEWS_REFRESH_INTERVAL_SECS`,
    /// `NEWS_FALLBACK_CATEGORY`, `NEWS_FALLBACK_COUNTRY`.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(raw) = std::env::var("NEWS_SOURCES") {
            let list = clean_list(raw.split(',').map(str::to_string).collect());
            if !list.is_empty() {
                cfg.sources = list;
            }
        }
        match load_sources_file_default() {
            Ok(Some(list)) => cfg.sources = list,
            Ok(None) => {}
            Err(e) => tracing::warn!(error = ?e, "ignoring sources file"),
        }

        if let Ok(v) = std::env::var("NEWS_LANGUAGE") {
            if !v.trim().is_empty() {
                cfg.language = v.trim().to_string();
            }
        }
        if let Some(n) = env_parse::<u32>("NEWS_MAX_RETRIES") {
            cfg.max_retries = n.max(1);
        }
        if let Some(n) = env_parse::<u64>("NEWS_BACKOFF_SECS") {
            cfg.backoff_secs = n;
        }
        if let Some(n) = env_parse::<u64>("NEWS_REFRESH_INTERVAL_SECS") {
            cfg.refresh_interval = Duration::from_secs(n.max(1));
        }
        if let Ok(v) = std::env::var("NEWS_FALLBACK_CATEGORY") {
            if !v.trim().is_empty() {
                cfg.fallback_category = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("NEWS_FALLBACK_COUNTRY") {
            if !v.trim().is_empty() {
                cfg.fallback_country = v.trim().to_string();
            }
        }

        cfg
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Load the source list from an explicit TOML path: `sources = ["bbc-news", ...]`.
pub fn load_sources_from(path: &Path) -> Result<Vec<String>> {
    #[derive(serde::Deserialize)]
    struct SourcesFile {
        sources: Vec<String>,
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let parsed: SourcesFile = toml::from_str(&content)?;
    let list = clean_list(parsed.sources);
    if list.is_empty() {
        return Err(anyhow!("sources file {} lists no sources", path.display()));
    }
    Ok(list)
}

/// `Ok(None)` when no file is configured; the env path must exist if set.
fn load_sources_file_default() -> Result<Option<Vec<String>>> {
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            return Err(anyhow!("NEWS_SOURCES_PATH points to non-existent path"));
        }
        return load_sources_from(&pb).map(Some);
    }
    Ok(None)
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
