// src/ingest/scheduler.rs
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::service::NewsService;

/// Spawn the periodic refresh task. Fires `service.refresh()` every `period`
/// until `shutdown` is signalled; the process must signal and await the handle
/// before exit so no refresh outlives it.
pub fn spawn_refresh_scheduler(
    service: Arc<NewsService>,
    period: Duration,
    shutdown: Arc<Notify>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The interval fires immediately; cold start is covered by the lazy
        // read path, so the first timed refresh lands one full period in.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    tracing::info!("refresh scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    tracing::info!("scheduled refresh: fetching and analyzing financial news");
                    counter!("snapshot_scheduled_refresh_total").increment(1);
                    service.refresh().await;
                }
            }
        }
    })
}
