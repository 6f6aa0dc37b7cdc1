pub mod capture;
pub mod cli;
pub mod models;
pub mod paths;
pub mod query;
pub mod store;
pub mod watch;

use std::sync::Arc;

use tokio::sync::Mutex;

use capture::CaptureOrchestrator;
use paths::Paths;
use store::RecordStore;
use watch::WatchController;

/// Everything a command handler needs, constructed once at startup and torn
/// down at shutdown. The store is only ever mutated through this aggregate:
/// by the REPL dispatcher or by the single watch loop.
pub struct App {
    pub paths: Paths,
    pub store: Arc<Mutex<RecordStore>>,
    pub orchestrator: Arc<CaptureOrchestrator>,
    pub watcher: WatchController,
}
