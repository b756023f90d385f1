//! CORS middleware configuration.

use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

/// Create a CORS layer from configuration.
///
/// With no origins configured the layer is permissive, which suits local
/// development. Configured origins switch to credentials mode with an
/// explicit header list, as the session cookie requires.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let parsed_origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    if parsed_origins.is_empty() {
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers(Any)
            .allow_origin(Any)
    } else {
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
            .allow_credentials(true)
            .allow_origin(parsed_origins)
    }
}
