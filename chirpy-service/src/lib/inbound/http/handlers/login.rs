use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::session::errors::SessionError;
use crate::domain::session::models::LoginSession;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::inbound::http::router::AppState;

const LOGIN_FAILED_MESSAGE: &str = "Incorrect email or password";

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let rejected = || ApiError::Unauthorized(LOGIN_FAILED_MESSAGE.to_string());

    // Malformed input fails the same way as a wrong password.
    let email = EmailAddress::new(body.email).map_err(|_| rejected())?;
    let password = Password::new(body.password).map_err(|_| rejected())?;

    let session = state
        .session_service
        .login(email, password, Utc::now())
        .await
        .map_err(|e| match e {
            SessionError::InvalidCredentials => rejected(),
            other => ApiError::from(other),
        })?;

    Ok(ApiSuccess::new(StatusCode::OK, session.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    #[serde(flatten)]
    pub user: UserData,
    pub token: String,
    pub refresh_token: String,
}

impl From<LoginSession> for LoginResponseData {
    fn from(session: LoginSession) -> Self {
        Self {
            user: (&session.user).into(),
            token: session.access_token,
            refresh_token: session.refresh_token,
        }
    }
}
