//! Periodic removal of connections that stopped pinging.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing;

use sidechain_realtime::RealtimeEngine;

/// Run [`RealtimeEngine::sweep_stale`] every `every` until cancelled.
pub async fn run_presence_sweep(engine: RealtimeEngine, every: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(every.max(Duration::from_secs(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                let swept = engine.sweep_stale().await;
                tracing::debug!(swept, "Presence timeout sweep tick");
            }
        }
    }
    tracing::info!("Presence timeout sweep stopped");
}
