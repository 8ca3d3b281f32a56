// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::auth::TokenPair;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email address
    pub username: String,
    pub password: String,
}

/// POST /auth/login - Exchange credentials for an access/refresh token pair
///
/// ```json
/// { "access_token": "...", "refresh_token": "...", "token_type": "Bearer", "expires_in": 3600 }
/// ```
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    let Json(request) = payload?;

    let identifier = request.username.trim();
    if identifier.is_empty() || request.password.is_empty() {
        return Err(ApiError::validation_error("Username and password are required", None));
    }

    let pair = state.sessions.login(identifier, &request.password).await?;
    Ok(Json(pair))
}
