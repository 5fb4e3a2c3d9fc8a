use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::ChirpData;
use crate::domain::chirp::errors::ChirpError;
use crate::domain::chirp::models::ListChirpsQuery;
use crate::domain::chirp::models::SortOrder;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;

/// Query string for `GET /api/chirps`.
#[derive(Debug, Default, Deserialize)]
pub struct ListChirpsParams {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

impl ListChirpsParams {
    fn try_into_query(self) -> Result<ListChirpsQuery, ChirpError> {
        let author = self
            .author_id
            .as_deref()
            .map(UserId::from_string)
            .transpose()?;
        let sort = self
            .sort
            .as_deref()
            .map(str::parse::<SortOrder>)
            .transpose()?
            .unwrap_or_default();

        Ok(ListChirpsQuery { author, sort })
    }
}

pub async fn list_chirps(
    State(state): State<AppState>,
    Query(params): Query<ListChirpsParams>,
) -> Result<ApiSuccess<Vec<ChirpData>>, ApiError> {
    let query = params.try_into_query()?;

    state
        .chirp_service
        .list_chirps(query)
        .await
        .map_err(ApiError::from)
        .map(|chirps| {
            ApiSuccess::new(StatusCode::OK, chirps.iter().map(ChirpData::from).collect())
        })
}
