//! File lifecycle service for stash.
//!
//! Orchestrates the multi-step operations (upload, rename, delete,
//! protection changes) across the blob store and the metadata store, and
//! resolves retrieval attempts through the access decision engine.
//!
//! Blob filesystem steps for mutating operations run inside the metadata
//! store's critical section, so a rename or delete racing a retrieval is
//! observed as a clean not-found rather than a torn state.

use chrono::{DateTime, Utc};

use crate::store::{BlobStore, FileRecord, MetadataStore, Persist};
use crate::{Result, StashError};

use super::access::{decide, AccessDecision};
use super::{allowed_file, generate_token, sanitize_name, split_extension};

/// Request data for a single file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Filename as supplied by the uploader (used for the extension).
    pub original_name: String,
    /// File content.
    pub content: Vec<u8>,
    /// Optional custom base name (sanitized; extension is appended).
    pub custom_name: Option<String>,
    /// Optional retrieval password.
    pub password: Option<String>,
    /// Optional visit limit; `0` or `None` means unlimited.
    pub visit_limit: Option<u32>,
}

impl UploadRequest {
    /// Create a plain upload request with no protection options.
    pub fn new(original_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            original_name: original_name.into(),
            content,
            custom_name: None,
            password: None,
            visit_limit: None,
        }
    }

    /// Set the custom base name.
    pub fn with_custom_name(mut self, name: impl Into<String>) -> Self {
        self.custom_name = Some(name.into());
        self
    }

    /// Set the retrieval password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the visit limit.
    pub fn with_visit_limit(mut self, limit: u32) -> Self {
        self.visit_limit = Some(limit);
        self
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Name the file was stored under (and is retrieved by).
    pub name: String,
    /// Size in bytes.
    pub size: u64,
}

/// One entry in a file listing: blob facts joined with protection state.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Stored filename.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: DateTime<Utc>,
    /// True if a retrieval password is set.
    pub protected: bool,
    /// Visit limit, if set.
    pub visit_limit: Option<u32>,
    /// Successful retrievals so far.
    pub visit_count: u32,
}

/// High-level file service combining blob and metadata stores.
#[derive(Debug)]
pub struct FileService {
    blobs: BlobStore,
    meta: MetadataStore,
}

impl FileService {
    /// Create a new FileService over the given stores.
    pub fn new(blobs: BlobStore, meta: MetadataStore) -> Self {
        Self { blobs, meta }
    }

    /// The underlying blob store.
    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Look up the protection record for a file.
    pub fn record(&self, name: &str) -> Option<FileRecord> {
        self.meta.get(name)
    }

    /// Resolve a retrieval attempt.
    ///
    /// Runs the access decision engine against the file's record and, when
    /// the decision is to serve a limited file, counts the visit inside the
    /// same critical section. A file with no record is fully public and gets
    /// no accounting.
    pub fn resolve_access(&self, name: &str, credential: Option<&str>) -> Result<AccessDecision> {
        if !self.blobs.exists(name) {
            return Ok(AccessDecision::NotFound);
        }

        self.meta.mutate(|records| {
            let Some(record) = records.get_mut(name) else {
                return (AccessDecision::Serve, Persist::Skip);
            };

            let (decision, counted) = decide(record, credential);
            let persist = if counted { Persist::Save } else { Persist::Skip };
            (decision, persist)
        })
    }

    /// Read the bytes of a stored file.
    ///
    /// This does not consult the access engine; callers resolve access
    /// first. A file deleted between the two steps reads as not found.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.blobs.load(name)
    }

    /// Open a stored file for streamed reading.
    ///
    /// Same contract as [`read`](Self::read), but hands back the file handle
    /// so large blobs never sit in memory whole.
    pub fn open(&self, name: &str) -> Result<std::fs::File> {
        self.blobs.open(name)
    }

    /// Upload a file.
    ///
    /// The stored name is the sanitized custom name if one was supplied and
    /// survives sanitization, otherwise a generated token; the original
    /// extension is appended either way. Rejects disallowed extensions and
    /// name collisions. The blob write is rolled back if the metadata write
    /// fails.
    pub fn upload(&self, request: UploadRequest) -> Result<StoredFile> {
        if !allowed_file(&request.original_name) {
            return Err(StashError::Validation(format!(
                "file type of \"{}\" is not allowed",
                request.original_name
            )));
        }

        let (_, ext) = split_extension(&request.original_name);
        let base = request
            .custom_name
            .as_deref()
            .map(sanitize_name)
            .filter(|b| !b.is_empty())
            .unwrap_or_else(generate_token);
        let name = format!("{base}{ext}");
        let size = request.content.len() as u64;

        let saved = self.meta.mutate(|records| {
            if let Err(e) = self.blobs.save(&name, &request.content) {
                return (Err(e), Persist::Skip);
            }

            let record = FileRecord {
                password: request.password.clone().filter(|p| !p.is_empty()),
                visit_limit: request.visit_limit.filter(|l| *l > 0),
                visit_count: 0,
            };
            records.insert(name.clone(), record);

            (Ok(()), Persist::Save)
        });

        match saved {
            Ok(Ok(())) => Ok(StoredFile { name, size }),
            Ok(Err(e)) => Err(e),
            Err(e) => {
                // Metadata flush failed after the blob landed; undo the blob
                // write so the two stores stay consistent.
                let _ = self.blobs.delete(&name);
                Err(e)
            }
        }
    }

    /// Rename a file, keeping its extension and protection state.
    ///
    /// Returns the new stored name. Rejects a missing source, a base name
    /// that sanitizes to empty, and a taken target name.
    pub fn rename(&self, old_name: &str, new_base: &str) -> Result<String> {
        let base = sanitize_name(new_base);
        if base.is_empty() {
            return Err(StashError::Validation("new name is invalid".to_string()));
        }

        let (_, ext) = split_extension(old_name);
        let new_name = format!("{base}{ext}");

        let moved = self.meta.mutate(|records| {
            if let Err(e) = self.blobs.rename(old_name, &new_name) {
                return (Err(e), Persist::Skip);
            }

            // Re-key the record; a file with no record gets none.
            match records.remove(old_name) {
                Some(record) => {
                    records.insert(new_name.clone(), record);
                    (Ok(()), Persist::Save)
                }
                None => (Ok(()), Persist::Skip),
            }
        });

        match moved {
            Ok(Ok(())) => Ok(new_name),
            Ok(Err(e)) => Err(e),
            Err(e) => {
                let _ = self.blobs.rename(&new_name, old_name);
                Err(e)
            }
        }
    }

    /// Delete a file and its record.
    pub fn delete(&self, name: &str) -> Result<()> {
        self.meta.mutate(|records| {
            match self.blobs.delete(name) {
                Ok(true) => {}
                Ok(false) => {
                    return (
                        Err(StashError::NotFound(format!("file \"{name}\""))),
                        Persist::Skip,
                    )
                }
                Err(e) => return (Err(e), Persist::Skip),
            }

            match records.remove(name) {
                Some(_) => (Ok(()), Persist::Save),
                None => (Ok(()), Persist::Skip),
            }
        })?
    }

    /// Set or clear the retrieval password for a file.
    ///
    /// An empty or absent password clears the field entirely. Creates a
    /// record if none exists yet.
    pub fn set_password(&self, name: &str, password: Option<&str>) -> Result<()> {
        self.meta.mutate(|records| {
            let record = records.entry(name.to_string()).or_default();
            record.password = password.filter(|p| !p.is_empty()).map(String::from);
            ((), Persist::Save)
        })
    }

    /// Set or clear the visit limit for a file.
    ///
    /// A limit that is not a positive integer clears both the limit and the
    /// count; setting a limit keeps an already-accumulated count. Creates a
    /// record if none exists yet.
    pub fn set_lock(&self, name: &str, limit: Option<u32>) -> Result<()> {
        self.meta.mutate(|records| {
            let record = records.entry(name.to_string()).or_default();
            match limit.filter(|l| *l > 0) {
                Some(l) => record.visit_limit = Some(l),
                None => {
                    record.visit_limit = None;
                    record.visit_count = 0;
                }
            }
            ((), Persist::Save)
        })
    }

    /// List all stored files with their protection state, most recently
    /// modified first.
    pub fn list(&self) -> Result<Vec<FileEntry>> {
        let records = self.meta.snapshot();
        let mut entries = Vec::new();

        for name in self.blobs.list()? {
            // A file deleted mid-listing just drops out.
            let (size, modified) = match (self.blobs.size(&name), self.blobs.modified(&name)) {
                (Ok(size), Ok(modified)) => (size, modified),
                _ => continue,
            };

            let record = records.get(&name).cloned().unwrap_or_default();
            entries.push(FileEntry {
                name,
                size,
                modified: DateTime::<Utc>::from(modified),
                protected: record.is_protected(),
                visit_limit: record.visit_limit,
                visit_count: record.visit_count,
            });
        }

        entries.sort_by(|a, b| b.modified.cmp(&a.modified).then(a.name.cmp(&b.name)));
        Ok(entries)
    }
}
