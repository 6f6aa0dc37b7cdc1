//! Contracts for the three external OS services the orchestrator consumes.
//! Production implementations live in `macos`; tests swap in fakes.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

/// Frontmost-application metadata at capture time.
#[derive(Debug, Clone, Default)]
pub struct FrontmostContext {
    pub app_name: String,
    pub window_title: String,
    pub url: Option<String>,
}

/// Produces an image file at `dest` or leaves it absent. Only the file's
/// existence is consumed by the core.
#[async_trait]
pub trait ScreenCapturer: Send + Sync {
    async fn capture(&self, dest: &Path) -> Result<()>;
}

/// Recognizes text in an image, lines joined with `\n` in visual reading
/// order. Callers treat any error as empty text.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &Path) -> Result<String>;
}

/// Reports which application was frontmost. Callers degrade errors to the
/// `"Unknown"` sentinel.
#[async_trait]
pub trait ContextSource: Send + Sync {
    async fn frontmost(&self) -> Result<FrontmostContext>;
}
