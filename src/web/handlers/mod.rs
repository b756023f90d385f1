//! HTTP handlers for stash.

use std::sync::Arc;

use crate::config::Secrets;
use crate::files::FileService;
use crate::web::middleware::SessionState;

pub mod admin;
pub mod api;
pub mod auth;
pub mod serve;

pub use admin::*;
pub use api::*;
pub use auth::*;
pub use serve::*;

/// Admin session lifetime in seconds (24 hours).
pub const SESSION_EXPIRY_SECS: u64 = 86400;

/// Shared application state for all handlers.
pub struct AppState {
    /// File service over the blob and metadata stores.
    pub service: Arc<FileService>,
    /// Generated secrets (master password hash, admin path).
    pub secrets: Secrets,
    /// Session token issuer and verifier.
    pub session: Arc<SessionState>,
    /// Public base URL for composing links.
    pub base_url: String,
    /// Maximum upload size in bytes.
    pub max_upload_size: u64,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        service: Arc<FileService>,
        secrets: Secrets,
        base_url: impl Into<String>,
        max_upload_size: u64,
    ) -> Self {
        let session = Arc::new(SessionState::new(&secrets.session_secret, SESSION_EXPIRY_SECS));
        Self {
            service,
            secrets,
            session,
            base_url: base_url.into(),
            max_upload_size,
        }
    }
}
