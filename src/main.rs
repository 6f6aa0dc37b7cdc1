use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

use hindsight::capture::{CaptureOrchestrator, OsascriptContext, Screencapture, TesseractOcr};
use hindsight::cli::{self, Command};
use hindsight::paths::Paths;
use hindsight::store::RecordStore;
use hindsight::watch::{WatchController, WATCH_INTERVAL};
use hindsight::App;

#[derive(Parser)]
#[command(name = "hindsight", about = "Searchable history of your screen")]
struct Args {
    /// Directory holding the index and captured images.
    #[arg(long, env = "HINDSIGHT_DIR")]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let root = match args.data_dir {
        Some(dir) => dir,
        None => Paths::default_root()?,
    };
    let paths = Paths::new(root);
    // The one fatal startup failure: a data directory we cannot create.
    paths.bootstrap()?;

    let store = Arc::new(Mutex::new(RecordStore::load(paths.index_path())));
    let orchestrator = Arc::new(CaptureOrchestrator::new(
        paths.clone(),
        store.clone(),
        Arc::new(Screencapture),
        Arc::new(TesseractOcr),
        Arc::new(OsascriptContext),
    ));
    let mut app = App {
        paths,
        store,
        orchestrator,
        watcher: WatchController::new(WATCH_INTERVAL),
    };

    println!(
        "hindsight — {} records indexed. Type 'help' for commands.",
        app.store.lock().await.len()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match cli::parse_command(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => {
                if let Err(err) = cli::dispatch(&mut app, command).await {
                    eprintln!("error: {err:#}");
                }
            }
            Err(err) => eprintln!("{err}"),
        }
    }

    app.watcher.stop().await?;
    Ok(())
}
