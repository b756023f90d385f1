//! JSON management API handlers.
//!
//! These endpoints back the chat-bot integration and any other automation;
//! they accept the admin session as a Bearer token as well as the cookie.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AdminSession;

/// One stored file in an API listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileInfo {
    /// Stored filename.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time, RFC 3339.
    pub modified: String,
    /// Whether a retrieval password is set.
    pub protected: bool,
    /// Visit limit, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit_limit: Option<u32>,
    /// Successful retrievals so far.
    pub visit_count: u32,
}

/// Request body for setting or clearing a retrieval password.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetPasswordRequest {
    /// New password; empty or absent clears it.
    #[serde(default)]
    pub password: Option<String>,
}

/// Visit limit value; accepts a number or a numeric string so form-ish
/// clients do not have to special-case the type.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum LimitValue {
    /// Plain number.
    Number(u32),
    /// Numeric string; anything unparseable clears the limit.
    Text(String),
}

impl LimitValue {
    fn as_limit(&self) -> Option<u32> {
        match self {
            LimitValue::Number(n) => Some(*n),
            LimitValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Request body for setting or clearing a visit limit.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetLockRequest {
    /// New limit; absent, zero or unparseable clears the lock entirely.
    #[serde(default)]
    pub limit: Option<LimitValue>,
}

/// Generic status reply.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Always "ok" on success.
    pub status: String,
}

impl StatusResponse {
    fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// GET /api/files - List all stored files.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "List of stored files", body = Vec<FileInfo>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    AdminSession(_claims): AdminSession,
) -> Result<Json<Vec<FileInfo>>, ApiError> {
    let entries = state.service.list()?;
    let response = entries
        .into_iter()
        .map(|e| FileInfo {
            name: e.name,
            size: e.size,
            modified: e.modified.to_rfc3339(),
            protected: e.protected,
            visit_limit: e.visit_limit,
            visit_count: e.visit_count,
        })
        .collect();

    Ok(Json(response))
}

/// POST /api/file/:name/password - Set or clear a retrieval password.
#[utoipa::path(
    post,
    path = "/file/{name}/password",
    tag = "files",
    params(
        ("name" = String, Path, description = "Stored filename")
    ),
    request_body = SetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = StatusResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn set_password(
    State(state): State<Arc<AppState>>,
    AdminSession(_claims): AdminSession,
    Path(name): Path<String>,
    Json(body): Json<SetPasswordRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    if !state.service.blobs().exists(&name) {
        return Err(ApiError::not_found("File not found"));
    }

    state.service.set_password(&name, body.password.as_deref())?;
    tracing::info!(file = %name, "password updated");
    Ok(Json(StatusResponse::ok()))
}

/// POST /api/file/:name/lock - Set or clear a visit limit.
#[utoipa::path(
    post,
    path = "/file/{name}/lock",
    tag = "files",
    params(
        ("name" = String, Path, description = "Stored filename")
    ),
    request_body = SetLockRequest,
    responses(
        (status = 200, description = "Visit limit updated", body = StatusResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn set_lock(
    State(state): State<Arc<AppState>>,
    AdminSession(_claims): AdminSession,
    Path(name): Path<String>,
    Json(body): Json<SetLockRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    if !state.service.blobs().exists(&name) {
        return Err(ApiError::not_found("File not found"));
    }

    let limit = body.limit.as_ref().and_then(LimitValue::as_limit);
    state.service.set_lock(&name, limit)?;
    tracing::info!(file = %name, limit = ?limit, "visit limit updated");
    Ok(Json(StatusResponse::ok()))
}

/// OpenAPI document for the management API.
#[derive(OpenApi)]
#[openapi(
    paths(list_files, set_password, set_lock),
    components(schemas(FileInfo, SetPasswordRequest, SetLockRequest, StatusResponse, LimitValue)),
    tags(
        (name = "files", description = "File management API")
    )
)]
pub struct ApiDoc;

/// GET /api/openapi.json - Serve the OpenAPI document.
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
