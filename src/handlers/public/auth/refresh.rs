// handlers/public/auth/refresh.rs - POST /auth/refresh handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::auth::TokenPair;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /auth/refresh - Rotate a refresh token into a new token pair
///
/// Only refresh tokens are accepted; presenting an access token yields
/// `401 WRONG_TOKEN_TYPE`.
pub async fn refresh_post(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    let Json(request) = payload?;
    let pair = state.sessions.refresh(request.refresh_token.trim()).await?;
    Ok(Json(pair))
}
