//! Test helpers for integration tests.

use std::sync::Arc;

use axum_test::TestServer;
use tempfile::TempDir;

use stash::config::Secrets;
use stash::files::FileService;
use stash::store::{BlobStore, MetadataStore};
use stash::web::handlers::AppState;
use stash::web::router::{create_health_router, create_router};

/// Master password used by all integration tests.
pub const MASTER_PASSWORD: &str = "master_password_1";

/// Fixed admin path so tests can address the panel routes.
pub const ADMIN_PATH: &str = "testadminpath";

/// Create test secrets with a known master password and admin path.
pub fn create_test_secrets() -> Secrets {
    Secrets {
        password_hash: stash::auth::hash_password(MASTER_PASSWORD).expect("hash master password"),
        session_secret: "test-session-secret-for-testing-only".to_string(),
        admin_path: ADMIN_PATH.to_string(),
    }
}

/// Create a test server over a temp directory.
///
/// The server saves cookies between requests, so a login call authenticates
/// the rest of the test.
pub fn create_test_server() -> (TestServer, Arc<AppState>, TempDir) {
    let temp_dir = TempDir::new().expect("create temp dir");

    let blobs = BlobStore::new(temp_dir.path().join("files")).expect("create blob store");
    let meta =
        MetadataStore::open(temp_dir.path().join("metadata.json")).expect("open metadata store");
    let service = Arc::new(FileService::new(blobs, meta));

    let app_state = Arc::new(AppState::new(
        service,
        create_test_secrets(),
        "http://localhost:8080",
        10 * 1024 * 1024,
    ));

    let router = create_router(app_state.clone(), app_state.session.clone(), &[])
        .merge(create_health_router());

    let mut server = TestServer::new(router).expect("create test server");
    server.save_cookies();

    (server, app_state, temp_dir)
}

/// Log in with the master password; the session cookie is stored on the
/// server for subsequent requests.
pub async fn login(server: &TestServer) {
    let response = server
        .post(&format!("/{ADMIN_PATH}"))
        .form(&[("password", MASTER_PASSWORD)])
        .await;
    assert_eq!(response.status_code(), 303, "login should redirect");
}

/// Build a multipart/form-data body for an upload request.
///
/// Each entry is (field_name, filename, content); fields without a filename
/// pass `None`.
pub fn multipart_body(
    boundary: &str,
    parts: &[(&str, Option<&str>, &[u8])],
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match filename {
            Some(fname) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{fname}\"\r\n\
Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
