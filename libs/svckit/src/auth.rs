//! Bearer-token authentication against the remote auth service.
//!
//! Tokens are never inspected locally. `require_auth` asks the
//! [`TokenVerifier`] who the caller is and stores the answer, together with
//! the raw `Authorization` header, in the request extensions so handlers can
//! forward the same credentials to sibling services.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use crate::problem::Problem;
use crate::remote::{RemoteClient, RemoteError};

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
    /// Inbound `Authorization` header, forwarded verbatim.
    pub authorization: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("token rejected")]
    Rejected,

    #[error("auth service unavailable: {0}")]
    Unavailable(#[source] RemoteError),
}

impl From<AuthError> for Problem {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingToken => Problem::unauthorized("A bearer token is required"),
            AuthError::Rejected => Problem::unauthorized("The access token is invalid or expired"),
            AuthError::Unavailable(err) => {
                tracing::warn!(error = %err, "token verification failed");
                Problem::bad_gateway("Could not verify the access token")
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        Problem::from(self).into_response()
    }
}

/// Resolves an access token to the id of its owner.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<i32, AuthError>;
}

/// `GET {base}/auth/verify-token?accessToken=...`
///
/// The auth service answers with the user record, either bare or wrapped in
/// a `user` field. 400, 401 and 403 mean the token is bad.
pub struct HttpTokenVerifier {
    client: Arc<RemoteClient>,
}

impl HttpTokenVerifier {
    #[must_use]
    pub fn new(client: Arc<RemoteClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TokenVerifier for HttpTokenVerifier {
    #[instrument(skip_all, fields(base = %self.client.base_url()))]
    async fn verify(&self, token: &str) -> Result<i32, AuthError> {
        let body: Value = self
            .client
            .get_json(&["auth", "verify-token"], &[("accessToken", token)], None)
            .await
            .map_err(|err| match err.status() {
                Some(400 | 401 | 403) => AuthError::Rejected,
                _ => AuthError::Unavailable(err),
            })?;

        user_id(&body).ok_or(AuthError::Rejected)
    }
}

fn user_id(body: &Value) -> Option<i32> {
    let user = body.get("user").filter(|u| u.is_object()).unwrap_or(body);
    user.get("id")
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
}

/// State for [`require_auth`].
#[derive(Clone)]
pub struct AuthState {
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthState {
    #[must_use]
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }
}

/// Middleware: reject unauthenticated requests, attach [`AuthUser`] otherwise.
pub async fn require_auth(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some((authorization, token)) = bearer(request.headers()) else {
        return AuthError::MissingToken.into_response();
    };

    match state.verifier.verify(&token).await {
        Ok(id) => {
            request
                .extensions_mut()
                .insert(AuthUser { id, authorization });
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

/// Raw header plus the token it carries.
fn bearer(headers: &HeaderMap) -> Option<(String, String)> {
    let raw = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;
    let token = raw.strip_prefix("Bearer ").map(str::trim)?;
    if token.is_empty() {
        return None;
    }
    Some((raw.to_owned(), token.to_owned()))
}

/// Extractor for the caller set by [`require_auth`].
#[derive(Debug, Clone)]
pub struct Authz(pub AuthUser);

impl<S> FromRequestParts<S> for Authz
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().map(Authz).ok_or_else(|| {
            tracing::error!("AuthUser missing, auth middleware not configured");
            Problem::internal()
        })
    }
}
