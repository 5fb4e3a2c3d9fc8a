use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use chrono::Utc;

use super::ApiError;
use crate::inbound::http::middleware::extract_bearer;
use crate::inbound::http::router::AppState;

/// Revoke the bearer refresh token. Unknown and already revoked tokens still
/// get a 204.
pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = extract_bearer(&headers).map_err(|e| {
        tracing::warn!(reason = %e, "Revoke rejected");
        ApiError::unauthorized()
    })?;

    state.session_service.revoke(token, Utc::now()).await?;

    Ok(StatusCode::NO_CONTENT)
}
