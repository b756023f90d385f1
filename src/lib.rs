//! stash - a self-hosted file distribution service.
//!
//! Files are uploaded through an admin panel or a chat-bot integration and
//! served over plain HTTP links. Each file can carry an optional retrieval
//! password and an optional visit limit; both live in a JSON metadata store
//! next to the blob directory.

pub mod auth;
pub mod bot;
pub mod config;
pub mod error;
pub mod files;
pub mod logging;
pub mod store;
pub mod web;

pub use auth::{hash_password, validate_password, verify_password};
pub use bot::{ManageSession, SessionOutcome};
pub use config::{Config, Secrets};
pub use error::{Result, StashError};
pub use files::{AccessDecision, FileService, UploadRequest};
pub use store::{BlobStore, FileRecord, MetadataStore};
pub use web::WebServer;
