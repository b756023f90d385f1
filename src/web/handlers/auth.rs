//! Admin login and logout handlers.
//!
//! The admin panel lives at a random path segment generated on first run,
//! so the login form is only reachable by someone who knows the URL.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

use crate::auth::verify_password;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AdminSession, SESSION_COOKIE};
use crate::web::templates;

/// Form body for master password login.
#[derive(Debug, serde::Deserialize)]
pub struct LoginForm {
    /// The master password.
    pub password: String,
}

/// Query parameters for the admin panel.
#[derive(Debug, serde::Deserialize)]
pub struct PanelQuery {
    /// One-shot status message from a completed action.
    pub msg: Option<String>,
}

/// GET /:admin_path - Admin panel, or the login form without a session.
pub async fn panel(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PanelQuery>,
    session: Option<AdminSession>,
) -> Result<Html<String>, ApiError> {
    if session.is_none() {
        return Ok(Html(templates::login_page(&state.secrets.admin_path)));
    }

    let files = state.service.list()?;
    Ok(Html(templates::panel_page(
        &state.secrets.admin_path,
        &files,
        query.msg.as_deref(),
    )))
}

/// POST /:admin_path - Verify the master password and start a session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    if verify_password(&form.password, &state.secrets.password_hash).is_err() {
        tracing::warn!("failed admin login attempt");
        return Err(ApiError::unauthorized("Invalid master password"));
    }

    let token = state.session.issue_token()?;
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    tracing::info!("admin logged in");

    let jar = jar.add(cookie);
    Ok((jar, Redirect::to(&format!("/{}", state.secrets.admin_path))).into_response())
}

/// GET /:admin_path/logout - Clear the session cookie.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    (jar, Redirect::to(&format!("/{}", state.secrets.admin_path))).into_response()
}
