//! Persistence layer for stash.
//!
//! Two stores share the on-disk state: a flat directory of blobs named by
//! their public filename, and a JSON file mapping filenames to protection
//! records.

mod blob;
mod metadata;

pub use blob::BlobStore;
pub use metadata::{FileRecord, MetadataStore, Persist, Records};
