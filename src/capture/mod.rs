mod macos;
mod providers;

pub use macos::{OsascriptContext, Screencapture, TesseractOcr};
pub use providers::{ContextSource, FrontmostContext, ScreenCapturer, TextRecognizer};

use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Result};
use chrono::Utc;
use log::{info, warn};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{Record, UNKNOWN_APP};
use crate::paths::Paths;
use crate::store::RecordStore;

/// Drives one capture end to end: screenshot, frontmost context, OCR,
/// record assembly, store insert (which persists the index).
pub struct CaptureOrchestrator {
    paths: Paths,
    store: Arc<Mutex<RecordStore>>,
    capturer: Arc<dyn ScreenCapturer>,
    recognizer: Arc<dyn TextRecognizer>,
    context: Arc<dyn ContextSource>,
}

impl CaptureOrchestrator {
    pub fn new(
        paths: Paths,
        store: Arc<Mutex<RecordStore>>,
        capturer: Arc<dyn ScreenCapturer>,
        recognizer: Arc<dyn TextRecognizer>,
        context: Arc<dyn ContextSource>,
    ) -> Self {
        Self {
            paths,
            store,
            capturer,
            recognizer,
            context,
        }
    }

    pub async fn capture(&self) -> Result<Record> {
        let capture_start = Instant::now();
        let captured_at = Utc::now();
        let image_path = self.paths.image_path(captured_at)?;

        // Only the file's existence matters; a capturer error with the file
        // present still counts as a successful capture.
        if let Err(err) = self.capturer.capture(&image_path).await {
            warn!("screen capture reported an error: {err:#}");
        }
        if !image_path.exists() {
            bail!(
                "no screenshot was produced at {}; check that Screen Recording \
                 permission is granted in System Settings > Privacy & Security",
                image_path.display()
            );
        }

        let context = match self.context.frontmost().await {
            Ok(context) => context,
            Err(err) => {
                warn!("frontmost context unavailable: {err:#}");
                FrontmostContext::default()
            }
        };
        let app_name = if context.app_name.is_empty() {
            UNKNOWN_APP.to_string()
        } else {
            context.app_name
        };

        // A screenshot with failed OCR is still worth keeping; it remains
        // searchable by app name and filename.
        let text = match self.recognizer.recognize(&image_path).await {
            Ok(text) => text,
            Err(err) => {
                warn!("ocr failed, keeping capture with empty text: {err:#}");
                String::new()
            }
        };

        let record = Record {
            id: Uuid::new_v4(),
            captured_at,
            image_path,
            text,
            app_name,
            window_title: context.window_title,
            url: context.url,
        };

        {
            let mut store = self.store.lock().await;
            store.insert(record.clone())?;
        }

        info!(
            "captured {} ({}) in {}ms",
            record.short_id(),
            record.app_name,
            capture_start.elapsed().as_millis()
        );
        Ok(record)
    }
}
