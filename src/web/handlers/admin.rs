//! Admin panel action handlers: upload, rename, delete.
//!
//! All actions require an admin session and answer with a redirect back to
//! the panel carrying a one-shot status message.

use axum::{
    extract::{Multipart, Path, State},
    response::Redirect,
    Form,
};
use std::sync::Arc;

use crate::files::UploadRequest;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AdminSession;

/// Form body for the rename action.
#[derive(Debug, serde::Deserialize)]
pub struct RenameForm {
    /// New base name; the extension is kept from the old name.
    pub new_name: String,
}

fn panel_redirect(state: &AppState, msg: &str) -> Redirect {
    Redirect::to(&format!(
        "/{}?msg={}",
        state.secrets.admin_path,
        urlencoding::encode(msg)
    ))
}

/// POST /upload - Upload one or more files.
///
/// The multipart stream carries repeated `file` fields plus parallel
/// `custom_name`, `password` and `visit_limit` fields; the n-th option
/// field applies to the n-th file.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    AdminSession(_claims): AdminSession,
    mut multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();
    let mut custom_names: Vec<String> = Vec::new();
    let mut passwords: Vec<String> = Vec::new();
    let mut visit_limits: Vec<String> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(|n| n.to_string())
                    .ok_or_else(|| ApiError::bad_request("file field without a filename"))?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::too_large(format!("upload failed: {e}")))?;
                if data.len() as u64 > state.max_upload_size {
                    return Err(ApiError::too_large("file exceeds the upload size limit"));
                }
                files.push((filename, data.to_vec()));
            }
            Some("custom_name") => custom_names.push(
                field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("invalid field: {e}")))?,
            ),
            Some("password") => passwords.push(
                field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("invalid field: {e}")))?,
            ),
            Some("visit_limit") => visit_limits.push(
                field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("invalid field: {e}")))?,
            ),
            _ => {}
        }
    }

    if files.is_empty() {
        return Ok(panel_redirect(&state, "No file selected"));
    }

    let mut outcomes: Vec<String> = Vec::new();
    for (index, (filename, content)) in files.into_iter().enumerate() {
        let mut request = UploadRequest::new(filename.clone(), content);
        if let Some(name) = custom_names.get(index).filter(|n| !n.is_empty()) {
            request = request.with_custom_name(name.clone());
        }
        if let Some(password) = passwords.get(index).filter(|p| !p.is_empty()) {
            request = request.with_password(password.clone());
        }
        if let Some(limit) = visit_limits.get(index).and_then(|l| l.parse::<u32>().ok()) {
            request = request.with_visit_limit(limit);
        }

        match state.service.upload(request) {
            Ok(stored) => {
                tracing::info!(file = %stored.name, size = stored.size, "file uploaded");
                outcomes.push(format!("Uploaded {}", stored.name));
            }
            Err(e) => {
                tracing::warn!(file = %filename, error = %e, "upload rejected");
                outcomes.push(format!("Failed {filename}: {e}"));
            }
        }
    }

    Ok(panel_redirect(&state, &outcomes.join("; ")))
}

/// POST /rename/:name - Rename a stored file.
pub async fn rename_file(
    State(state): State<Arc<AppState>>,
    AdminSession(_claims): AdminSession,
    Path(name): Path<String>,
    Form(form): Form<RenameForm>,
) -> Result<Redirect, ApiError> {
    match state.service.rename(&name, &form.new_name) {
        Ok(new_name) => {
            tracing::info!(from = %name, to = %new_name, "file renamed");
            Ok(panel_redirect(
                &state,
                &format!("Renamed {name} to {new_name}"),
            ))
        }
        Err(e) => {
            tracing::warn!(file = %name, error = %e, "rename rejected");
            Ok(panel_redirect(&state, &format!("Rename failed: {e}")))
        }
    }
}

/// POST /delete/:name - Delete a stored file.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    AdminSession(_claims): AdminSession,
    Path(name): Path<String>,
) -> Result<Redirect, ApiError> {
    match state.service.delete(&name) {
        Ok(()) => {
            tracing::info!(file = %name, "file deleted");
            Ok(panel_redirect(&state, &format!("Deleted {name}")))
        }
        Err(e) => {
            tracing::warn!(file = %name, error = %e, "delete rejected");
            Ok(panel_redirect(&state, &format!("Delete failed: {e}")))
        }
    }
}
