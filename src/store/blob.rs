//! Blob storage for stash.
//!
//! A thin wrapper over a flat directory of files, each stored under its
//! public filename. All access-control logic lives above this layer.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::{Result, StashError};

/// Blob store backed by a single directory.
#[derive(Debug, Clone)]
pub struct BlobStore {
    /// Directory holding the stored files.
    base_path: PathBuf,
}

impl BlobStore {
    /// Create a new BlobStore rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the directory this store is rooted at.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a stored name to its path inside the base directory.
    ///
    /// Names arrive from the public retrieval URL, so anything that could
    /// address an entry outside the base directory is refused here, before
    /// any filesystem call. Path separators and dot components never occur
    /// in stored names.
    fn blob_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(StashError::NotFound(format!("file \"{name}\"")));
        }

        Ok(self.base_path.join(name))
    }

    /// Check whether a blob exists.
    pub fn exists(&self, name: &str) -> bool {
        self.blob_path(name).is_ok_and(|p| p.is_file())
    }

    /// Save content under the given name.
    ///
    /// Fails with [`StashError::Conflict`] if a blob with that name already
    /// exists; existing files are never overwritten.
    pub fn save(&self, name: &str, content: &[u8]) -> Result<()> {
        let path = self.blob_path(name)?;
        if path.exists() {
            return Err(StashError::Conflict(format!(
                "a file named \"{name}\" already exists"
            )));
        }

        fs::write(&path, content)?;
        Ok(())
    }

    /// Load the content of a blob.
    pub fn load(&self, name: &str) -> Result<Vec<u8>> {
        match fs::read(self.blob_path(name)?) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StashError::NotFound(format!("file \"{name}\"")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Open a blob for reading without loading it into memory.
    pub fn open(&self, name: &str) -> Result<fs::File> {
        match fs::File::open(self.blob_path(name)?) {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StashError::NotFound(format!("file \"{name}\"")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Rename a blob.
    ///
    /// Fails if the source is missing or the target name is taken.
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<()> {
        let old_path = self.blob_path(old_name)?;
        if !old_path.is_file() {
            return Err(StashError::NotFound(format!("file \"{old_name}\"")));
        }

        let new_path = self.blob_path(new_name)?;
        if new_path.exists() {
            return Err(StashError::Conflict(format!(
                "a file named \"{new_name}\" already exists"
            )));
        }

        fs::rename(old_path, new_path)?;
        Ok(())
    }

    /// Delete a blob.
    ///
    /// Returns `true` if the blob was deleted, `false` if it didn't exist.
    pub fn delete(&self, name: &str) -> Result<bool> {
        match fs::remove_file(self.blob_path(name)?) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the size of a blob in bytes.
    pub fn size(&self, name: &str) -> Result<u64> {
        match fs::metadata(self.blob_path(name)?) {
            Ok(m) => Ok(m.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StashError::NotFound(format!("file \"{name}\"")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get the last-modified time of a blob.
    pub fn modified(&self, name: &str) -> Result<SystemTime> {
        match fs::metadata(self.blob_path(name)?) {
            Ok(m) => Ok(m.modified()?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StashError::NotFound(format!("file \"{name}\"")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List all stored blob names.
    ///
    /// Subdirectories and entries with non-UTF-8 names are skipped.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }
}
