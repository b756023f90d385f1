//! File management for stash.
//!
//! This module holds the naming rules, the access decision engine, and the
//! lifecycle service that ties the blob store and metadata store together.

mod access;
mod service;

pub use access::AccessDecision;
pub use service::{FileEntry, FileService, StoredFile, UploadRequest};

/// Extensions accepted for upload, matched case-insensitively on the final
/// extension only.
pub const ALLOWED_EXTENSIONS: [&str; 9] = [
    "txt", "pdf", "png", "jpg", "jpeg", "gif", "mp4", "mov", "webm",
];

/// Default maximum upload size (500 MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 500 * 1024 * 1024;

/// Strip every character outside `[a-zA-Z0-9_-]` from a user-supplied name.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Split a filename into stem and extension (extension keeps its dot and
/// original case; a leading dot is part of the stem).
pub fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => (&filename[..idx], &filename[idx..]),
        _ => (filename, ""),
    }
}

/// True if the filename carries an allowed extension.
pub fn allowed_file(filename: &str) -> bool {
    let (_, ext) = split_extension(filename);
    match ext.strip_prefix('.') {
        Some(ext) => ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// Generate a unique 32-character hex token for a stored name.
pub fn generate_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
