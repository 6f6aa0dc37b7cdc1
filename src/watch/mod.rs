mod controller;
mod loop_worker;

pub use controller::{WatchController, WATCH_INTERVAL};

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tempfile::TempDir;

    use crate::capture::test_support::{paths_in, store_in, FakeCapturer, StaticContext, StaticOcr};
    use crate::capture::CaptureOrchestrator;

    use super::WatchController;

    fn orchestrator_with_counter(dir: &TempDir) -> (Arc<CaptureOrchestrator>, Arc<FakeCapturer>) {
        let capturer = Arc::new(FakeCapturer::new());
        let orchestrator = Arc::new(CaptureOrchestrator::new(
            paths_in(dir.path()),
            store_in(dir.path()),
            capturer.clone(),
            Arc::new(StaticOcr("tick")),
            Arc::new(StaticContext("Terminal")),
        ));
        (orchestrator, capturer)
    }

    #[tokio::test(start_paused = true)]
    async fn watch_captures_immediately_then_on_the_interval() {
        let dir = TempDir::new().unwrap();
        let (orchestrator, capturer) = orchestrator_with_counter(&dir);
        let mut watcher = WatchController::new(Duration::from_secs(30));

        watcher.start(orchestrator).unwrap();
        tokio::time::sleep(Duration::from_secs(95)).await;
        watcher.stop().await.unwrap();

        // Ticks at t = 0, 30, 60, 90.
        assert_eq!(capturer.call_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_rejected_and_does_not_double_the_rate() {
        let dir = TempDir::new().unwrap();
        let (orchestrator, capturer) = orchestrator_with_counter(&dir);
        let mut watcher = WatchController::new(Duration::from_secs(30));

        watcher.start(orchestrator.clone()).unwrap();
        assert!(watcher.is_watching());
        assert!(watcher.start(orchestrator).is_err());

        tokio::time::sleep(Duration::from_secs(95)).await;
        watcher.stop().await.unwrap();

        assert_eq!(capturer.call_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_while_idle_is_a_no_op() {
        let mut watcher = WatchController::new(Duration::from_secs(30));
        assert!(!watcher.is_watching());
        assert!(!watcher.stop().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn watch_can_be_restarted_after_stop() {
        let dir = TempDir::new().unwrap();
        let (orchestrator, capturer) = orchestrator_with_counter(&dir);
        let mut watcher = WatchController::new(Duration::from_secs(30));

        watcher.start(orchestrator.clone()).unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(watcher.stop().await.unwrap());
        assert!(!watcher.is_watching());

        watcher.start(orchestrator).unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(watcher.stop().await.unwrap());

        // One immediate capture per start.
        assert_eq!(capturer.call_count(), 2);
    }
}
