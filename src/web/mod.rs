//! Web layer for stash: public file retrieval, the admin panel and the
//! JSON management API.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod templates;

pub use handlers::AppState;
pub use server::WebServer;
