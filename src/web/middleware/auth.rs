//! Admin session authentication middleware.
//!
//! A successful master password login issues a signed session token,
//! delivered as an HttpOnly cookie for the browser panel and usable as a
//! Bearer token by API clients.

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::web::error::ApiError;
use crate::{Result, StashError};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "stash_session";

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject; always "admin", there is a single operator identity.
    pub sub: String,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// Token ID (unique identifier).
    pub jti: String,
}

/// Shared state for issuing and verifying session tokens.
#[derive(Clone)]
pub struct SessionState {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry_secs: u64,
}

impl SessionState {
    /// Create a new session state from the signing secret.
    pub fn new(secret: &str, expiry_secs: u64) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry_secs,
        }
    }

    /// Issue a new admin session token.
    pub fn issue_token(&self) -> Result<String> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = SessionClaims {
            sub: "admin".to_string(),
            iat: now,
            exp: now + self.expiry_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| StashError::Auth(format!("token signing failed: {e}")))
    }

    /// Verify a session token and return its claims.
    pub fn verify_token(&self, token: &str) -> Result<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| StashError::Auth("invalid or expired session".to_string()))
    }
}

/// Extractor for authenticated admin sessions.
///
/// Accepts the session cookie or an `Authorization: Bearer` header; either
/// must carry a valid, unexpired token.
#[derive(Debug, Clone)]
pub struct AdminSession(pub SessionClaims);

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<
            dyn std::future::Future<Output = std::result::Result<Self, Self::Rejection>>
                + Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            // Bearer header first, then the cookie set at login
            let header_token = parts
                .headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(|t| t.to_string());

            let token = match header_token {
                Some(t) => t,
                None => CookieJar::from_headers(&parts.headers)
                    .get(SESSION_COOKIE)
                    .map(|c| c.value().to_string())
                    .ok_or_else(|| ApiError::unauthorized("Missing authorization"))?,
            };

            // Session state is injected into extensions by middleware
            let session_state = parts
                .extensions
                .get::<Arc<SessionState>>()
                .ok_or_else(|| ApiError::internal("Session state not configured"))?;

            let claims = session_state.verify_token(&token).map_err(|e| {
                tracing::debug!("session validation failed: {}", e);
                ApiError::unauthorized("Invalid or expired session")
            })?;

            Ok(AdminSession(claims))
        })
    }
}

/// Middleware function to inject session state into request extensions.
pub async fn session_auth(
    session_state: Arc<SessionState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(session_state);
    next.run(request).await
}
