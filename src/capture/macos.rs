//! Production providers that shell out to the OS: `screencapture(1)` for the
//! screenshot, `tesseract(1)` for OCR, `osascript(1)` for frontmost-app
//! metadata and browser URLs.

use std::path::Path;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

use super::providers::{ContextSource, FrontmostContext, ScreenCapturer, TextRecognizer};

pub struct Screencapture;

#[async_trait]
impl ScreenCapturer for Screencapture {
    async fn capture(&self, dest: &Path) -> Result<()> {
        let status = Command::new("screencapture")
            .arg("-x")
            .arg(dest)
            .status()
            .await
            .context("failed to run screencapture")?;
        if !status.success() {
            bail!("screencapture exited with {status}");
        }
        Ok(())
    }
}

pub struct TesseractOcr;

#[async_trait]
impl TextRecognizer for TesseractOcr {
    async fn recognize(&self, image: &Path) -> Result<String> {
        let output = Command::new("tesseract")
            .arg(image)
            .arg("stdout")
            .output()
            .await
            .context("failed to run tesseract")?;
        if !output.status.success() {
            bail!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let text = String::from_utf8_lossy(&output.stdout);
        Ok(text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

const FRONTMOST_APP_SCRIPT: &str = r#"tell application "System Events" to get name of first application process whose frontmost is true"#;
const FRONT_WINDOW_SCRIPT: &str = r#"tell application "System Events" to tell (first application process whose frontmost is true) to get name of front window"#;
const SAFARI_URL_SCRIPT: &str = r#"tell application "Safari" to get URL of current tab of front window"#;
const CHROME_URL_SCRIPT: &str = r#"tell application "Google Chrome" to get URL of active tab of front window"#;

pub struct OsascriptContext;

impl OsascriptContext {
    async fn run(script: &str) -> Result<String> {
        let output = Command::new("osascript")
            .arg("-e")
            .arg(script)
            .output()
            .await
            .context("failed to run osascript")?;
        if !output.status.success() {
            bail!(
                "osascript exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl ContextSource for OsascriptContext {
    async fn frontmost(&self) -> Result<FrontmostContext> {
        let app_name = Self::run(FRONTMOST_APP_SCRIPT).await?;

        // Apps without a standard front window make the title script error;
        // an empty title is fine.
        let window_title = Self::run(FRONT_WINDOW_SCRIPT).await.unwrap_or_default();

        let url = match app_name.as_str() {
            "Safari" => Self::run(SAFARI_URL_SCRIPT).await.ok(),
            "Google Chrome" => Self::run(CHROME_URL_SCRIPT).await.ok(),
            _ => None,
        };

        Ok(FrontmostContext {
            app_name,
            window_title,
            url: url.filter(|u| !u.is_empty()),
        })
    }
}
