use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use crate::domain::chirp::errors::ChirpError;
use crate::domain::chirp::models::ChirpId;
use crate::domain::session::models::Principal;
use crate::inbound::http::router::AppState;

/// Delete one of the caller's chirps.
pub async fn delete_chirp(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let chirp_id = ChirpId::from_string(&id).map_err(ChirpError::from)?;

    state
        .chirp_service
        .delete_chirp(&chirp_id, &principal.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
