//! Web server for stash.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{Config, Secrets};
use crate::files::FileService;
use crate::{Result, StashError};

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// HTTP server hosting file retrieval, the admin panel and the management
/// API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// CORS allowed origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, secrets: Secrets, service: Arc<FileService>) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| StashError::Config(format!("invalid server address: {e}")))?;

        let app_state = AppState::new(
            service,
            secrets,
            config.server.base_url.clone(),
            config.max_upload_size(),
        );

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            cors_origins: config.server.cors_origins.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// URL path of the admin panel.
    pub fn admin_path(&self) -> String {
        format!("/{}", self.app_state.secrets.admin_path)
    }

    fn build_router(&self) -> axum::Router {
        let session_state = self.app_state.session.clone();
        create_router(self.app_state.clone(), session_state, &self.cors_origins)
            .merge(create_health_router())
    }

    /// Run the web server.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let router = self.build_router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let router = self.build_router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
