use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel app name used when the frontmost application cannot be determined.
pub const UNKNOWN_APP: &str = "Unknown";

/// One indexed capture event: a reference to the screenshot on disk plus the
/// metadata and recognized text it was indexed with. Timestamp, image path and
/// text never change after creation; only deletion removes a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: Uuid,
    pub captured_at: DateTime<Utc>,
    pub image_path: PathBuf,
    pub text: String,
    pub app_name: String,
    pub window_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Record {
    /// Hyphenated lowercase rendering used for prefix lookup.
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }

    /// First 8 hex chars of the id, shown in listings.
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }

    /// File name component of the image path, matched by free-text search.
    pub fn image_filename(&self) -> String {
        self.image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
