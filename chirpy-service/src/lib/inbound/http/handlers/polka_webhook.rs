use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use crate::domain::user::models::UserId;
use crate::inbound::http::middleware::extract_api_key;
use crate::inbound::http::router::AppState;

const USER_UPGRADED_EVENT: &str = "user.upgraded";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PolkaWebhookRequest {
    event: String,
    data: PolkaWebhookData,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PolkaWebhookData {
    user_id: String,
}

/// Payment provider callback. Only `user.upgraded` has an effect; every other
/// event is acknowledged and ignored.
///
/// The API key is checked before the body is parsed, so an unauthenticated
/// caller always gets 401 whatever it sends.
pub async fn polka_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<PolkaWebhookRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let presented = extract_api_key(&headers).map_err(|e| {
        tracing::warn!(reason = %e, "Webhook rejected");
        ApiError::unauthorized()
    })?;

    if !auth::api_keys_match(&state.polka_api_key, presented) {
        tracing::warn!("Webhook rejected: API key mismatch");
        return Err(ApiError::unauthorized());
    }

    let Json(body) = body.map_err(|e| ApiError::UnprocessableEntity(e.body_text()))?;

    if body.event != USER_UPGRADED_EVENT {
        tracing::debug!(event = %body.event, "Ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = UserId::from_string(&body.data.user_id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid user ID: {}", e)))?;

    state.user_service.upgrade_to_chirpy_red(&user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
