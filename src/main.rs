//! Financial News Sentiment Service — Binary Entrypoint
//! Boots the Axum HTTP server, the periodic refresh scheduler, and the
//! Prometheus recorder.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::Notify;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use finnews_sentiment::api::{self, AppState};
use finnews_sentiment::assistant::{DynAssistant, HuggingFaceAssistant};
use finnews_sentiment::config::PipelineConfig;
use finnews_sentiment::ingest::newsapi::NewsApiClient;
use finnews_sentiment::ingest::scheduler::spawn_refresh_scheduler;
use finnews_sentiment::metrics::Metrics;
use finnews_sentiment::service::NewsService;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let news_api_key = std::env::var("NEWSAPI_KEY")
        .map_err(|_| anyhow::anyhow!("NEWSAPI_KEY missing. Please check your .env file."))?;
    let hf_token = std::env::var("HUGGINGFACE_API_TOKEN").map_err(|_| {
        anyhow::anyhow!("HUGGINGFACE_API_TOKEN missing. Please check your .env file.")
    })?;

    let cfg = PipelineConfig::from_env();
    let metrics = Metrics::init(cfg.refresh_interval.as_secs());

    let client = Arc::new(NewsApiClient::new(news_api_key, cfg.language.clone()));
    let service = Arc::new(NewsService::new(client, cfg.clone()));
    let assistant: DynAssistant = Arc::new(HuggingFaceAssistant::new(hf_token));

    let shutdown = Arc::new(Notify::new());
    let scheduler = spawn_refresh_scheduler(
        Arc::clone(&service),
        cfg.refresh_interval,
        Arc::clone(&shutdown),
    );

    let app = api::create_router(AppState { service, assistant }).merge(metrics.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("ctrl-c received, shutting down");
        })
        .await?;

    // The scheduler must stop before exit so no refresh outlives the process.
    shutdown.notify_one();
    scheduler.await?;

    Ok(())
}
