//! Router configuration for the stash web server.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    delete_file, list_files, login, logout, openapi_spec, panel, rename_file, serve_file,
    set_lock, set_password, upload, AppState,
};
use super::middleware::{create_cors_layer, session_auth, SessionState};

/// Create the main router.
///
/// The admin panel routes are mounted under the random path segment from
/// the generated secrets, so the route table differs per installation.
pub fn create_router(
    app_state: Arc<AppState>,
    session_state: Arc<SessionState>,
    cors_origins: &[String],
) -> Router {
    let admin_path = app_state.secrets.admin_path.clone();
    let max_upload_size = app_state.max_upload_size as usize;

    let api_routes = Router::new()
        .route("/files", get(list_files))
        .route("/file/:name/password", post(set_password))
        .route("/file/:name/lock", post(set_lock))
        .route("/openapi.json", get(openapi_spec));

    let session_state_for_middleware = session_state.clone();

    Router::new()
        .route("/files/:name", get(serve_file).post(serve_file))
        .route(&format!("/{admin_path}"), get(panel).post(login))
        .route(&format!("/{admin_path}/logout"), get(logout))
        .route("/upload", post(upload))
        .route("/rename/:name", post(rename_file))
        .route("/delete/:name", post(delete_file))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = session_state_for_middleware.clone();
                    session_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
