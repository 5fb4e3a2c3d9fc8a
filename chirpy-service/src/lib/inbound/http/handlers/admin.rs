use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::config::Platform;
use crate::inbound::http::router::AppState;

/// File server hit count as an HTML page.
pub async fn metrics(State(state): State<AppState>) -> Html<String> {
    let hits = state.metrics.file_server_hits.load(Ordering::Relaxed);

    Html(format!(
        r#"<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {hits} times!</p>
  </body>
</html>
"#
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetResponseData {
    pub refresh_tokens_deleted: u64,
    pub chirps_deleted: u64,
    pub users_deleted: u64,
}

/// Wipe every account, chirp and refresh token and zero the hit counter.
/// Only available on the dev platform.
pub async fn reset(
    State(state): State<AppState>,
) -> Result<ApiSuccess<ResetResponseData>, ApiError> {
    if state.platform != Platform::Dev {
        tracing::warn!(platform = ?state.platform, "Reset refused outside dev");
        return Err(ApiError::Forbidden(
            "Reset is only allowed in dev environment".to_string(),
        ));
    }

    let refresh_tokens_deleted = state.session_service.delete_all_sessions().await?;
    let chirps_deleted = state.chirp_service.delete_all_chirps().await?;
    let users_deleted = state.user_service.delete_all_users().await?;
    state.metrics.file_server_hits.store(0, Ordering::Relaxed);

    tracing::warn!(
        users_deleted,
        chirps_deleted,
        refresh_tokens_deleted,
        "Application state reset"
    );

    Ok(ApiSuccess::new(
        StatusCode::OK,
        ResetResponseData {
            refresh_tokens_deleted,
            chirps_deleted,
            users_deleted,
        },
    ))
}
