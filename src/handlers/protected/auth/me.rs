// handlers/protected/auth/me.rs - GET /auth/me

use axum::{extract::State, Json};

use crate::database::models::UserProfile;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// GET /auth/me - Public projection of the caller's account
///
/// Reads the directory rather than the token so the profile is current.
pub async fn me_get(State(state): State<AppState>, user: AuthUser) -> Result<Json<UserProfile>, ApiError> {
    let record = state
        .stores
        .users
        .find_by_id(user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserProfile::from(record)))
}
