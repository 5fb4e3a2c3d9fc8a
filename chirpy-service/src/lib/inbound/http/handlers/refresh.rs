use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::session::models::RefreshedSession;
use crate::inbound::http::middleware::extract_bearer;
use crate::inbound::http::router::AppState;

/// Exchange the bearer refresh token for a new access token.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiSuccess<RefreshResponseData>, ApiError> {
    let token = extract_bearer(&headers).map_err(|e| {
        tracing::warn!(reason = %e, "Refresh rejected");
        ApiError::unauthorized()
    })?;

    let session = state
        .session_service
        .refresh(token, Utc::now())
        .await
        .map_err(|e| {
            if e.is_credential_failure() {
                tracing::warn!(reason = %e, "Refresh rejected");
            }
            ApiError::from(e)
        })?;

    Ok(ApiSuccess::new(StatusCode::OK, session.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshResponseData {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl From<RefreshedSession> for RefreshResponseData {
    fn from(session: RefreshedSession) -> Self {
        Self {
            token: session.access_token,
            refresh_token: session.refresh_token,
        }
    }
}
