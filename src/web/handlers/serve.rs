//! Public file retrieval handler.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::StashError;

use crate::files::AccessDecision;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::templates;

/// Query parameters for file retrieval.
#[derive(Debug, serde::Deserialize)]
pub struct ServeQuery {
    /// Retrieval password supplied in the link.
    pub password: Option<String>,
}

/// Form body for the password prompt round trip.
#[derive(Debug, Default, serde::Deserialize)]
pub struct ServeForm {
    /// Retrieval password typed into the prompt.
    pub password: Option<String>,
}

/// Generate a safe Content-Disposition header value.
///
/// Removes control characters to prevent header injection and falls back to
/// RFC 5987 encoding for non-ASCII filenames.
fn content_disposition_header(filename: &str) -> String {
    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("inline; filename=\"{}\"", filename);
    }

    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();
    let encoded = urlencoding::encode(filename);

    format!(
        "inline; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// GET/POST /files/:name - Retrieve a stored file.
///
/// The password may arrive as a query parameter (shareable links) or as the
/// form posted back from the prompt page. A protected file without a valid
/// password renders the prompt; an exhausted file renders the locked page
/// with 403.
pub async fn serve_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<ServeQuery>,
    form: Option<Form<ServeForm>>,
) -> Result<Response, ApiError> {
    let form = form.map(|Form(f)| f).unwrap_or_default();
    let credential = form.password.or(query.password);
    let credential = credential.as_deref().filter(|p| !p.is_empty());

    let decision = state.service.resolve_access(&name, credential)?;
    match decision {
        AccessDecision::Serve => {
            // Uploads run to hundreds of megabytes; the body goes straight
            // from disk to the socket, never through a buffer.
            let file = state.service.open(&name)?;
            let size = file.metadata().map_err(StashError::from)?.len();
            let mime = mime_guess::from_path(&name).first_or_octet_stream();

            tracing::info!(file = %name, size, "serving file");

            let stream = ReaderStream::new(tokio::fs::File::from_std(file));
            Ok((
                [
                    (header::CONTENT_TYPE, mime.to_string()),
                    (header::CONTENT_LENGTH, size.to_string()),
                    (header::CONTENT_DISPOSITION, content_disposition_header(&name)),
                ],
                Body::from_stream(stream),
            )
                .into_response())
        }
        AccessDecision::NotFound => Err(ApiError::not_found("File not found")),
        AccessDecision::Locked => Ok((
            StatusCode::FORBIDDEN,
            Html(templates::locked_page(&name)),
        )
            .into_response()),
        AccessDecision::PasswordRequired => {
            Ok(Html(templates::password_prompt(&name)).into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_plain_ascii() {
        assert_eq!(
            content_disposition_header("report.pdf"),
            "inline; filename=\"report.pdf\""
        );
    }

    #[test]
    fn test_content_disposition_strips_injection() {
        let value = content_disposition_header("evil\r\nSet-Cookie: x.pdf");
        assert!(!value.contains('\r'));
        assert!(!value.contains('\n'));
    }

    #[test]
    fn test_content_disposition_quotes_replaced() {
        let value = content_disposition_header("we\"ird.txt");
        assert!(value.contains("we_ird.txt"));
    }
}
