//! Integration tests for file retrieval, the admin panel and the
//! management API.

mod common;

use common::{create_test_server, login, multipart_body, ADMIN_PATH};
use serde_json::{json, Value};
use stash::files::UploadRequest;

// ============================================================================
// Retrieval
// ============================================================================

#[tokio::test]
async fn test_serve_public_file() {
    let (server, state, _temp_dir) = create_test_server();
    state
        .service
        .upload(UploadRequest::new("hello.txt", b"hello world".to_vec()).with_custom_name("hello"))
        .unwrap();

    let response = server.get("/files/hello.txt").await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"hello world");

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/plain"));

    let content_length = response.headers().get("content-length").unwrap();
    assert_eq!(content_length.to_str().unwrap(), "11");
}

#[tokio::test]
async fn test_serve_missing_file() {
    let (server, _state, _temp_dir) = create_test_server();

    let response = server.get("/files/nope.txt").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_traversal_name_cannot_escape_blob_dir() {
    let (server, state, _temp_dir) = create_test_server();
    state
        .service
        .upload(
            UploadRequest::new("secret.txt", b"classified".to_vec())
                .with_custom_name("secret")
                .with_password("hunter2"),
        )
        .unwrap();

    // The metadata file holding the per-file passwords sits beside the blob
    // directory; a percent-encoded slash in the name must not reach it.
    let response = server.get("/files/..%2Fmetadata.json").await;
    response.assert_status_not_found();
    assert!(!response.text().contains("hunter2"));

    let response = server.get("/files/..%2F..%2F..%2Fetc%2Fpasswd").await;
    response.assert_status_not_found();

    // Backslashes are refused the same way
    let response = server.get("/files/..%5Cmetadata.json").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_visit_limit_enforced_over_http() {
    let (server, state, _temp_dir) = create_test_server();
    state
        .service
        .upload(
            UploadRequest::new("report.pdf", b"pdf bytes".to_vec())
                .with_custom_name("report")
                .with_visit_limit(2),
        )
        .unwrap();

    server.get("/files/report.pdf").await.assert_status_ok();
    server.get("/files/report.pdf").await.assert_status_ok();

    // Third visit is refused with the locked page
    let response = server.get("/files/report.pdf").await;
    response.assert_status(axum::http::StatusCode::FORBIDDEN);
    assert!(response.text().contains("File Locked"));

    // The count stays at the limit
    let record = state.service.record("report.pdf").unwrap();
    assert_eq!(record.visit_count, 2);
}

#[tokio::test]
async fn test_password_prompt_and_access() {
    let (server, state, _temp_dir) = create_test_server();
    state
        .service
        .upload(
            UploadRequest::new("secret.txt", b"classified".to_vec())
                .with_custom_name("secret")
                .with_password("letmein"),
        )
        .unwrap();

    // No password: the prompt page, not the file
    let response = server.get("/files/secret.txt").await;
    response.assert_status_ok();
    assert!(response.text().contains("Password Required"));

    // Wrong password in the query: still the prompt
    let response = server.get("/files/secret.txt?password=wrong").await;
    assert!(response.text().contains("Password Required"));

    // Correct password in the query
    let response = server.get("/files/secret.txt?password=letmein").await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"classified");

    // Correct password via the prompt form
    let response = server
        .post("/files/secret.txt")
        .form(&[("password", "letmein")])
        .await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"classified");

    // No limit set, so none of this was counted
    assert_eq!(state.service.record("secret.txt").unwrap().visit_count, 0);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _state, _temp_dir) = create_test_server();

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}

// ============================================================================
// Admin panel
// ============================================================================

#[tokio::test]
async fn test_panel_requires_login() {
    let (server, _state, _temp_dir) = create_test_server();

    // Without a session the admin path shows the login form
    let response = server.get(&format!("/{ADMIN_PATH}")).await;
    response.assert_status_ok();
    assert!(response.text().contains("Admin Login"));

    login(&server).await;

    let response = server.get(&format!("/{ADMIN_PATH}")).await;
    response.assert_status_ok();
    assert!(response.text().contains("File Admin"));
}

#[tokio::test]
async fn test_login_wrong_password_rejected() {
    let (server, _state, _temp_dir) = create_test_server();

    let response = server
        .post(&format!("/{ADMIN_PATH}"))
        .form(&[("password", "wrong_password")])
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let (server, _state, _temp_dir) = create_test_server();
    login(&server).await;

    let response = server.get(&format!("/{ADMIN_PATH}/logout")).await;
    assert_eq!(response.status_code(), 303);

    let response = server.get(&format!("/{ADMIN_PATH}")).await;
    assert!(response.text().contains("Admin Login"));
}

#[tokio::test]
async fn test_upload_requires_session() {
    let (server, _state, _temp_dir) = create_test_server();

    let boundary = "XTESTBOUNDARY";
    let body = multipart_body(boundary, &[("file", Some("a.txt"), b"data")]);

    let response = server
        .post("/upload")
        .content_type(&format!("multipart/form-data; boundary={boundary}"))
        .bytes(body.into())
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_with_options() {
    let (server, state, _temp_dir) = create_test_server();
    login(&server).await;

    let boundary = "XTESTBOUNDARY";
    let body = multipart_body(
        boundary,
        &[
            ("file", Some("report.pdf"), b"pdf bytes"),
            ("custom_name", None, b"q3 report"),
            ("password", None, b"letmein"),
            ("visit_limit", None, b"5"),
        ],
    );

    let response = server
        .post("/upload")
        .content_type(&format!("multipart/form-data; boundary={boundary}"))
        .bytes(body.into())
        .await;
    assert_eq!(response.status_code(), 303);

    // Sanitized custom name keeps the original extension
    let record = state.service.record("q3report.pdf").unwrap();
    assert_eq!(record.password.as_deref(), Some("letmein"));
    assert_eq!(record.visit_limit, Some(5));
    assert_eq!(state.service.read("q3report.pdf").unwrap(), b"pdf bytes");
}

#[tokio::test]
async fn test_upload_disallowed_type_reported() {
    let (server, state, _temp_dir) = create_test_server();
    login(&server).await;

    let boundary = "XTESTBOUNDARY";
    let body = multipart_body(boundary, &[("file", Some("evil.exe"), b"nope")]);

    let response = server
        .post("/upload")
        .content_type(&format!("multipart/form-data; boundary={boundary}"))
        .bytes(body.into())
        .await;

    // The panel redirect carries the failure message instead of an error page
    assert_eq!(response.status_code(), 303);
    let location = response.headers().get("location").unwrap().to_str().unwrap();
    assert!(location.contains("Failed"));
    assert!(state.service.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_rename_and_delete_via_panel() {
    let (server, state, _temp_dir) = create_test_server();
    login(&server).await;

    state
        .service
        .upload(UploadRequest::new("old.txt", b"data".to_vec()).with_custom_name("old"))
        .unwrap();

    let response = server
        .post("/rename/old.txt")
        .form(&[("new_name", "new")])
        .await;
    assert_eq!(response.status_code(), 303);
    assert!(state.service.blobs().exists("new.txt"));
    assert!(!state.service.blobs().exists("old.txt"));

    let response = server.post("/delete/new.txt").await;
    assert_eq!(response.status_code(), 303);
    assert!(!state.service.blobs().exists("new.txt"));

    server.get("/files/new.txt").await.assert_status_not_found();
}

// ============================================================================
// Management API
// ============================================================================

#[tokio::test]
async fn test_api_requires_auth() {
    let (server, _state, _temp_dir) = create_test_server();

    let response = server.get("/api/files").await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);

    let response = server
        .post("/api/file/a.txt/password")
        .json(&json!({"password": "x"}))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_accepts_bearer_token() {
    let (server, state, _temp_dir) = create_test_server();

    state
        .service
        .upload(UploadRequest::new("a.txt", b"x".to_vec()).with_custom_name("a"))
        .unwrap();

    let token = state.session.issue_token().unwrap();
    let response = server
        .get("/api/files")
        .add_header(axum::http::header::AUTHORIZATION, format!("Bearer {token}"))
        .await;
    response.assert_status_ok();

    let files: Value = response.json();
    assert_eq!(files.as_array().unwrap().len(), 1);
    assert_eq!(files[0]["name"], "a.txt");
    assert_eq!(files[0]["protected"], false);
}

#[tokio::test]
async fn test_api_set_password_and_lock() {
    let (server, state, _temp_dir) = create_test_server();
    login(&server).await;

    state
        .service
        .upload(UploadRequest::new("a.txt", b"x".to_vec()).with_custom_name("a"))
        .unwrap();

    let response = server
        .post("/api/file/a.txt/password")
        .json(&json!({"password": "pw"}))
        .await;
    response.assert_status_ok();
    assert!(state.service.record("a.txt").unwrap().is_protected());

    // Numeric string is accepted for the limit
    let response = server
        .post("/api/file/a.txt/lock")
        .json(&json!({"limit": "3"}))
        .await;
    response.assert_status_ok();
    assert_eq!(state.service.record("a.txt").unwrap().visit_limit, Some(3));

    // Clearing the password
    let response = server
        .post("/api/file/a.txt/password")
        .json(&json!({"password": ""}))
        .await;
    response.assert_status_ok();
    assert!(!state.service.record("a.txt").unwrap().is_protected());

    // Zero clears the lock
    let response = server
        .post("/api/file/a.txt/lock")
        .json(&json!({"limit": 0}))
        .await;
    response.assert_status_ok();
    let record = state.service.record("a.txt").unwrap();
    assert_eq!(record.visit_limit, None);
    assert_eq!(record.visit_count, 0);
}

#[tokio::test]
async fn test_api_unknown_file_is_404() {
    let (server, _state, _temp_dir) = create_test_server();
    login(&server).await;

    let response = server
        .post("/api/file/ghost.txt/password")
        .json(&json!({"password": "pw"}))
        .await;
    response.assert_status_not_found();

    let response = server
        .post("/api/file/ghost.txt/lock")
        .json(&json!({"limit": 1}))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_api_listing_reflects_state() {
    let (server, state, _temp_dir) = create_test_server();
    login(&server).await;

    state
        .service
        .upload(
            UploadRequest::new("guarded.png", b"png".to_vec())
                .with_custom_name("guarded")
                .with_password("pw")
                .with_visit_limit(4),
        )
        .unwrap();
    state.service.resolve_access("guarded.png", Some("pw")).unwrap();

    let response = server.get("/api/files").await;
    response.assert_status_ok();

    let files: Value = response.json();
    assert_eq!(files[0]["name"], "guarded.png");
    assert_eq!(files[0]["protected"], true);
    assert_eq!(files[0]["visit_limit"], 4);
    assert_eq!(files[0]["visit_count"], 1);
}

#[tokio::test]
async fn test_openapi_document_served() {
    let (server, _state, _temp_dir) = create_test_server();

    let response = server.get("/api/openapi.json").await;
    response.assert_status_ok();

    let doc: Value = response.json();
    assert!(doc["paths"].get("/files").is_some());
}
