use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::capture::CaptureOrchestrator;

/// Captures immediately (the interval's first tick fires at once), then every
/// `interval` until cancelled. Capture errors are logged and the loop carries
/// on with the next tick.
pub(super) async fn watch_loop(
    orchestrator: Arc<CaptureOrchestrator>,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Awaited inside the tick arm: cancellation is not observed
                // until the in-flight capture finishes.
                match orchestrator.capture().await {
                    Ok(record) => {
                        info!("watch capture {} ({})", record.short_id(), record.app_name)
                    }
                    Err(err) => error!("watch capture failed: {err:#}"),
                }
            }
            _ = cancel_token.cancelled() => {
                info!("watch loop shutting down");
                break;
            }
        }
    }
}
