//! In-memory record index with a flush-after-every-mutation JSON file behind
//! it. Records are kept most-recent-first; insertion always prepends.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::warn;
use serde_json::Value;

use crate::models::Record;

pub struct RecordStore {
    index_path: PathBuf,
    records: Vec<Record>,
}

impl RecordStore {
    /// Loads the index from disk. A missing file is a normal first run; an
    /// unreadable or corrupt file degrades to an empty store with a warning.
    pub fn load(index_path: PathBuf) -> Self {
        let records = match fs::read_to_string(&index_path) {
            Ok(contents) => parse_index(&contents, &index_path),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                warn!(
                    "could not read index {}: {err}; starting with an empty store",
                    index_path.display()
                );
                Vec::new()
            }
        };

        Self {
            index_path,
            records,
        }
    }

    /// Prepends a record and persists. An id collision is rejected; it cannot
    /// occur when ids come from `Uuid::new_v4`.
    pub fn insert(&mut self, record: Record) -> Result<()> {
        if self.records.iter().any(|existing| existing.id == record.id) {
            bail!("record id {} already present in the index", record.id);
        }
        self.records.insert(0, record);
        self.save()
    }

    /// First record (most recently inserted) whose id starts with the prefix.
    pub fn find(&self, id_prefix: &str) -> Option<&Record> {
        let prefix = id_prefix.to_lowercase();
        self.records
            .iter()
            .find(|record| record.id_string().starts_with(&prefix))
    }

    /// Removes the first record matching the prefix, persists, and then
    /// best-effort deletes the associated image file. Returns the removed
    /// record so the caller can report what went away.
    pub fn delete(&mut self, id_prefix: &str) -> Result<Record> {
        let prefix = id_prefix.to_lowercase();
        let Some(position) = self
            .records
            .iter()
            .position(|record| record.id_string().starts_with(&prefix))
        else {
            bail!("no record matching id prefix '{id_prefix}'");
        };

        let record = self.records.remove(position);
        self.save()?;

        if let Err(err) = fs::remove_file(&record.image_path) {
            warn!(
                "could not remove image {}: {err}",
                record.image_path.display()
            );
        }

        Ok(record)
    }

    /// Read-only view, most recent first.
    pub fn all(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serializes the full sequence to a sibling temp file and renames it over
    /// the index, so readers never observe a partial write. A save failure
    /// leaves the in-memory state intact; it just will not survive a restart.
    pub fn save(&self) -> Result<()> {
        let serialized = serde_json::to_string_pretty(&self.records)
            .context("failed to serialize record index")?;

        let tmp_path = self.index_path.with_extension("json.tmp");
        fs::write(&tmp_path, serialized)
            .with_context(|| format!("failed to write index to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.index_path).with_context(|| {
            format!("failed to move index into place at {}", self.index_path.display())
        })?;

        Ok(())
    }
}

/// Entries that fail to deserialize are skipped individually so one corrupt
/// line does not throw away the rest of the history.
fn parse_index(contents: &str, index_path: &Path) -> Vec<Record> {
    let value: Value = match serde_json::from_str(contents) {
        Ok(value) => value,
        Err(err) => {
            warn!(
                "index {} is not valid JSON: {err}; starting with an empty store",
                index_path.display()
            );
            return Vec::new();
        }
    };

    let Value::Array(entries) = value else {
        warn!(
            "index {} is not a JSON array; starting with an empty store",
            index_path.display()
        );
        return Vec::new();
    };

    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Record>(entry) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("skipping corrupt index entry: {err}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;
    use uuid::Uuid;

    fn record_in(dir: &TempDir, app: &str, text: &str, age_secs: i64) -> Record {
        let id = Uuid::new_v4();
        let image_path = dir.path().join(format!("{id}.png"));
        fs::write(&image_path, b"png").unwrap();
        Record {
            id,
            captured_at: Utc::now() - Duration::seconds(age_secs),
            image_path,
            text: text.to_string(),
            app_name: app.to_string(),
            window_title: String::new(),
            url: None,
        }
    }

    fn fresh_store(dir: &TempDir) -> RecordStore {
        RecordStore::load(dir.path().join("index.json"))
    }

    #[test]
    fn all_returns_reverse_insertion_order() {
        let dir = TempDir::new().unwrap();
        let mut store = fresh_store(&dir);

        let first = record_in(&dir, "Terminal", "one", 30);
        let second = record_in(&dir, "Safari", "two", 20);
        let third = record_in(&dir, "Xcode", "three", 10);
        store.insert(first.clone()).unwrap();
        store.insert(second.clone()).unwrap();
        store.insert(third.clone()).unwrap();

        let ids: Vec<Uuid> = store.all().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = fresh_store(&dir);

        let record = record_in(&dir, "Terminal", "one", 0);
        store.insert(record.clone()).unwrap();
        assert!(store.insert(record).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn save_then_load_round_trips_the_sequence() {
        let dir = TempDir::new().unwrap();
        let mut store = fresh_store(&dir);

        for i in 0..5 {
            store
                .insert(record_in(&dir, "Notes", &format!("entry {i}"), i))
                .unwrap();
        }
        let before: Vec<Uuid> = store.all().iter().map(|r| r.id).collect();

        let reloaded = fresh_store(&dir);
        let after: Vec<Uuid> = reloaded.all().iter().map(|r| r.id).collect();
        assert_eq!(before, after);
        assert_eq!(reloaded.all()[0].text, store.all()[0].text);
    }

    #[test]
    fn find_resolves_a_unique_prefix() {
        let dir = TempDir::new().unwrap();
        let mut store = fresh_store(&dir);

        let a = record_in(&dir, "Terminal", "a", 10);
        let b = record_in(&dir, "Safari", "b", 5);
        store.insert(a.clone()).unwrap();
        store.insert(b.clone()).unwrap();

        let found = store.find(&a.id_string()[..8]).unwrap();
        assert_eq!(found.id, a.id);
        assert!(store.find("zzzzzzzz").is_none());
    }

    #[test]
    fn find_prefers_the_most_recent_on_an_ambiguous_prefix() {
        let dir = TempDir::new().unwrap();
        let mut store = fresh_store(&dir);

        store.insert(record_in(&dir, "A", "old", 10)).unwrap();
        store.insert(record_in(&dir, "B", "new", 0)).unwrap();

        // Empty prefix matches everything; the most recent insert wins.
        let found = store.find("").unwrap();
        assert_eq!(found.text, "new");
    }

    #[test]
    fn delete_removes_record_image_and_persisted_entry() {
        let dir = TempDir::new().unwrap();
        let mut store = fresh_store(&dir);

        let doomed = record_in(&dir, "Terminal", "doomed", 10);
        let keeper = record_in(&dir, "Safari", "keeper", 5);
        store.insert(doomed.clone()).unwrap();
        store.insert(keeper.clone()).unwrap();

        let removed = store.delete(&doomed.id_string()[..8]).unwrap();
        assert_eq!(removed.id, doomed.id);
        assert!(!doomed.image_path.exists());
        assert!(store.all().iter().all(|r| r.id != doomed.id));

        let reloaded = fresh_store(&dir);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.all()[0].id, keeper.id);
    }

    #[test]
    fn delete_with_unmatched_prefix_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut store = fresh_store(&dir);
        store.insert(record_in(&dir, "Terminal", "x", 0)).unwrap();

        assert!(store.delete("ffffffff-0000").is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn corrupt_index_degrades_to_empty_store() {
        let dir = TempDir::new().unwrap();
        let index_path = dir.path().join("index.json");
        fs::write(&index_path, "{not json at all").unwrap();

        let store = RecordStore::load(index_path);
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_entries_are_skipped_individually() {
        let dir = TempDir::new().unwrap();
        let mut store = fresh_store(&dir);
        store.insert(record_in(&dir, "Terminal", "good", 0)).unwrap();

        // Splice a bogus entry into the persisted array.
        let index_path = dir.path().join("index.json");
        let mut entries: Vec<Value> =
            serde_json::from_str(&fs::read_to_string(&index_path).unwrap()).unwrap();
        entries.push(serde_json::json!({"id": "not-a-uuid"}));
        fs::write(&index_path, serde_json::to_string(&entries).unwrap()).unwrap();

        let reloaded = RecordStore::load(index_path);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.all()[0].text, "good");
    }
}
