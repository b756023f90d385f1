//! Middleware for the stash web layer.

pub mod auth;
pub mod cors;

pub use auth::{session_auth, AdminSession, SessionClaims, SessionState, SESSION_COOKIE};
pub use cors::create_cors_layer;
