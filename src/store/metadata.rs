//! Metadata store for stash.
//!
//! Holds the per-file protection state (password, visit limit, visit count)
//! keyed by stored filename. The whole mapping lives in memory behind a
//! mutex and is rewritten to a single JSON file on every mutation, so all
//! read-modify-write cycles are serialized through one critical section.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::{Result, StashError};

/// Protection state for a single stored file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Shared secret required to retrieve the file; `None` means public.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Maximum number of successful retrievals; `None` means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_limit: Option<u32>,
    /// Successful retrievals counted so far.
    #[serde(default)]
    pub visit_count: u32,
}

impl FileRecord {
    /// True if a password is required to retrieve the file.
    pub fn is_protected(&self) -> bool {
        self.password.is_some()
    }

    /// True if the visit limit has been reached.
    ///
    /// The limit is inclusive: with `visit_limit = N`, the Nth visit
    /// succeeds and the (N+1)th is refused.
    pub fn is_locked(&self) -> bool {
        matches!(self.visit_limit, Some(limit) if self.visit_count >= limit)
    }
}

/// Mapping from stored filename to its protection state.
pub type Records = BTreeMap<String, FileRecord>;

/// Whether a mutation changed the record map and must be flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persist {
    /// Write the map back to disk.
    Save,
    /// Nothing changed; skip the write.
    Skip,
}

/// File-backed metadata store.
///
/// The backing file holds the full mapping as one JSON object and is
/// rewritten in full on every save; there is no incremental persistence.
#[derive(Debug)]
pub struct MetadataStore {
    path: PathBuf,
    records: Mutex<Records>,
}

impl MetadataStore {
    /// Open the store at the given path.
    ///
    /// A missing backing file loads as an empty mapping (fresh install). A
    /// file that exists but cannot be parsed is an error; resetting it to
    /// empty would silently drop every password and lock.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = Self::read_file(&path)?;

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Path of the backing JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up the record for a filename.
    pub fn get(&self, name: &str) -> Option<FileRecord> {
        self.lock().get(name).cloned()
    }

    /// True if a record exists for the filename.
    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Snapshot of the full mapping.
    pub fn snapshot(&self) -> Records {
        self.lock().clone()
    }

    /// Apply `f` to the record map inside the store's critical section.
    ///
    /// The map is flushed to disk before the lock is released when `f`
    /// signals [`Persist::Save`]. Callers perform every read-modify-write
    /// cycle through a single `mutate` call; two separate calls would allow
    /// another writer in between.
    ///
    /// If the flush fails, the in-memory map is restored to its previous
    /// state so memory never runs ahead of disk.
    pub fn mutate<T>(&self, f: impl FnOnce(&mut Records) -> (T, Persist)) -> Result<T> {
        let mut records = self.lock();
        let backup = records.clone();
        let (value, persist) = f(&mut records);

        if persist == Persist::Save {
            if let Err(e) = self.write_file(&records) {
                *records = backup;
                return Err(e);
            }
        }

        Ok(value)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Records> {
        // A poisoned lock means a panic mid-mutation; the in-memory map is
        // still the last consistent state that was flushed or loaded.
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read_file(path: &Path) -> Result<Records> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Records::new()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&data).map_err(|e| {
            StashError::Store(format!(
                "metadata file {} is unreadable: {e}",
                path.display()
            ))
        })
    }

    fn write_file(&self, records: &Records) -> Result<()> {
        let json = serde_json::to_vec_pretty(records)
            .map_err(|e| StashError::Store(format!("failed to serialize metadata: {e}")))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, MetadataStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = MetadataStore::open(temp_dir.path().join("metadata.json")).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let (_temp_dir, store) = setup_store();
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_open_corrupt_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("metadata.json");
        fs::write(&path, b"{not json").unwrap();

        let result = MetadataStore::open(&path);
        assert!(matches!(result, Err(StashError::Store(_))));
    }

    #[test]
    fn test_mutate_and_get() {
        let (_temp_dir, store) = setup_store();

        store
            .mutate(|records| {
                records.insert(
                    "a.txt".to_string(),
                    FileRecord {
                        password: Some("secret".to_string()),
                        ..FileRecord::default()
                    },
                );
                ((), Persist::Save)
            })
            .unwrap();

        let record = store.get("a.txt").unwrap();
        assert_eq!(record.password.as_deref(), Some("secret"));
        assert_eq!(record.visit_count, 0);
        assert!(store.contains("a.txt"));
        assert!(!store.contains("b.txt"));
    }

    #[test]
    fn test_save_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("metadata.json");

        {
            let store = MetadataStore::open(&path).unwrap();
            store
                .mutate(|records| {
                    records.insert(
                        "keep.pdf".to_string(),
                        FileRecord {
                            visit_limit: Some(3),
                            visit_count: 1,
                            ..FileRecord::default()
                        },
                    );
                    ((), Persist::Save)
                })
                .unwrap();
        }

        let reopened = MetadataStore::open(&path).unwrap();
        let record = reopened.get("keep.pdf").unwrap();
        assert_eq!(record.visit_limit, Some(3));
        assert_eq!(record.visit_count, 1);
    }

    #[test]
    fn test_skip_does_not_write() {
        let (_temp_dir, store) = setup_store();

        store
            .mutate(|records| {
                records.insert("ghost.txt".to_string(), FileRecord::default());
                ((), Persist::Skip)
            })
            .unwrap();

        // The in-memory map changed but nothing was flushed.
        assert!(!store.path().exists());
    }

    #[test]
    fn test_mutate_returns_value() {
        let (_temp_dir, store) = setup_store();

        let count = store
            .mutate(|records| {
                records.insert("x.txt".to_string(), FileRecord::default());
                (records.len(), Persist::Save)
            })
            .unwrap();

        assert_eq!(count, 1);
    }

    #[test]
    fn test_absent_fields_not_serialized() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("metadata.json");

        let store = MetadataStore::open(&path).unwrap();
        store
            .mutate(|records| {
                records.insert("plain.txt".to_string(), FileRecord::default());
                ((), Persist::Save)
            })
            .unwrap();

        let json = fs::read_to_string(&path).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("visit_limit"));
        assert!(json.contains("visit_count"));
    }

    #[test]
    fn test_record_is_protected() {
        let mut record = FileRecord::default();
        assert!(!record.is_protected());

        record.password = Some("pw".to_string());
        assert!(record.is_protected());
    }

    #[test]
    fn test_record_is_locked_boundary() {
        let mut record = FileRecord {
            visit_limit: Some(2),
            ..FileRecord::default()
        };

        record.visit_count = 1;
        assert!(!record.is_locked());

        record.visit_count = 2;
        assert!(record.is_locked());

        // No limit means never locked, whatever the count says.
        record.visit_limit = None;
        assert!(!record.is_locked());
    }

    #[test]
    fn test_deserialize_sparse_record() {
        // Records written by older tooling may omit any of the fields.
        let record: FileRecord = serde_json::from_str(r#"{"password":"pw"}"#).unwrap();
        assert_eq!(record.password.as_deref(), Some("pw"));
        assert_eq!(record.visit_limit, None);
        assert_eq!(record.visit_count, 0);
    }
}
