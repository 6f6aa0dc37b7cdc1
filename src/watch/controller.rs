use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::capture::CaptureOrchestrator;

use super::loop_worker::watch_loop;

pub const WATCH_INTERVAL: Duration = Duration::from_secs(30);

/// Idle/Watching state machine for the periodic capture loop. At most one
/// loop is ever active; a second `start` is rejected rather than racing a
/// duplicate producer against the store.
pub struct WatchController {
    interval: Duration,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl WatchController {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            handle: None,
            cancel_token: None,
        }
    }

    pub fn is_watching(&self) -> bool {
        self.handle.is_some()
    }

    pub fn start(&mut self, orchestrator: Arc<CaptureOrchestrator>) -> Result<()> {
        if self.handle.is_some() {
            bail!("watch mode is already running");
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();
        let handle = tokio::spawn(watch_loop(orchestrator, self.interval, token_clone));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    /// Cancels the loop and waits for it to finish. A capture already in
    /// flight runs to completion; cancellation only prevents the next tick.
    /// Returns false when nothing was watching.
    pub async fn stop(&mut self) -> Result<bool> {
        let Some(token) = self.cancel_token.take() else {
            return Ok(false);
        };
        token.cancel();

        if let Some(handle) = self.handle.take() {
            handle.await.context("watch loop task failed to join")?;
        }
        info!("watch mode stopped");
        Ok(true)
    }
}
