use std::sync::atomic::Ordering;

use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use chrono::DateTime;
use chrono::Utc;
use thiserror::Error;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::Principal;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

const BEARER_SCHEME: &str = "Bearer";
const API_KEY_SCHEME: &str = "ApiKey";

/// Why no credential could be read from the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("Missing Authorization header")]
    MissingCredential,

    #[error("Authorization header does not carry a {0} credential")]
    MalformedScheme(&'static str),
}

/// Why the guard turned a request away.
#[derive(Debug, Clone, Error)]
pub enum GuardError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Rejected(#[from] SessionError),
}

/// Read a `<scheme> <credential>` pair from the `Authorization` header.
///
/// The scheme name is matched case-insensitively; an empty credential counts as
/// malformed.
fn extract_credential<'a>(
    headers: &'a HeaderMap,
    scheme: &'static str,
) -> Result<&'a str, CredentialError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(CredentialError::MissingCredential)?
        .to_str()
        .map_err(|_| CredentialError::MalformedScheme(scheme))?;

    let (presented_scheme, credential) = value
        .trim()
        .split_once(' ')
        .ok_or(CredentialError::MalformedScheme(scheme))?;

    let credential = credential.trim();
    if !presented_scheme.eq_ignore_ascii_case(scheme) || credential.is_empty() {
        return Err(CredentialError::MalformedScheme(scheme));
    }

    Ok(credential)
}

/// Token from `Authorization: Bearer <token>`.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, CredentialError> {
    extract_credential(headers, BEARER_SCHEME)
}

/// Key from `Authorization: ApiKey <key>`.
pub fn extract_api_key(headers: &HeaderMap) -> Result<&str, CredentialError> {
    extract_credential(headers, API_KEY_SCHEME)
}

/// Resolve the principal behind a request's bearer access token.
pub async fn authorize(
    headers: &HeaderMap,
    sessions: &dyn SessionServicePort,
    now: DateTime<Utc>,
) -> Result<Principal, GuardError> {
    let token = extract_bearer(headers)?;
    Ok(sessions.authenticate(token, now).await?)
}

/// Middleware that admits only requests carrying a valid access token and
/// stores the resulting [`Principal`] in the request extensions.
///
/// Every rejection produces the same 401; the reason is only logged.
pub async fn require_principal(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = authorize(req.headers(), state.session_service.as_ref(), Utc::now())
        .await
        .map_err(|e| match e {
            GuardError::Rejected(ref err) if !err.is_credential_failure() => {
                ApiError::from(err.clone())
            }
            _ => {
                tracing::warn!(reason = %e, path = %req.uri().path(), "Request rejected by guard");
                ApiError::unauthorized()
            }
        })?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// Counts requests to the static file server.
pub async fn count_file_server_hit(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    state.metrics.file_server_hits.fetch_add(1, Ordering::Relaxed);
    next.run(req).await
}
