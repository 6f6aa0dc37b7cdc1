use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};

/// Data-directory layout: `<root>/index.json` plus screenshots under
/// `<root>/images/<YYYY-MM-DD>/<HHMMSS>.png`.
#[derive(Debug, Clone)]
pub struct Paths {
    root: PathBuf,
}

impl Paths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Default root when no flag or env override is given: `$HOME/.hindsight`.
    pub fn default_root() -> Result<PathBuf> {
        match std::env::var_os("HOME") {
            Some(home) => Ok(PathBuf::from(home).join(".hindsight")),
            None => bail!("cannot determine home directory; pass --data-dir"),
        }
    }

    /// Creates the root and image directories. This is the only failure that
    /// is fatal at startup.
    pub fn bootstrap(&self) -> Result<()> {
        fs::create_dir_all(self.images_dir()).with_context(|| {
            format!(
                "failed to create image directory {}",
                self.images_dir().display()
            )
        })
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    /// Per-day directory and second-granularity filename. A same-second
    /// collision across runs overwrites the older image; accepted as rare.
    pub fn image_path(&self, captured_at: DateTime<Utc>) -> Result<PathBuf> {
        let day_dir = self
            .images_dir()
            .join(captured_at.format("%Y-%m-%d").to_string());
        fs::create_dir_all(&day_dir)
            .with_context(|| format!("failed to create {}", day_dir.display()))?;
        Ok(day_dir.join(format!("{}.png", captured_at.format("%H%M%S"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn image_path_encodes_day_and_second() {
        let dir = TempDir::new().unwrap();
        let paths = Paths::new(dir.path().to_path_buf());
        let at = Utc.with_ymd_and_hms(2026, 8, 26, 14, 30, 5).unwrap();

        let path = paths.image_path(at).unwrap();
        assert_eq!(
            path,
            dir.path().join("images").join("2026-08-26").join("143005.png")
        );
        assert!(path.parent().unwrap().is_dir());
    }
}
