use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use tracing::info;

use super::{prepare, with_files};
use crate::database::models::{DiaryView, NewDiary};
use crate::database::Owner;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

pub async fn diary_get(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<DiaryView>, ApiError> {
    let Path(id) = path?;
    let owner = Owner::from(&user);

    let diary = state.stores.diaries.get(owner, id).await?;
    let mut views = with_files(&state, owner, vec![diary]).await?;
    views
        .pop()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Diary not found"))
}

/// PUT /diaries/:id - Replace content, mood, tags and the linked bill
pub async fn diary_put(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<NewDiary>, JsonRejection>,
) -> Result<Json<DiaryView>, ApiError> {
    let Path(id) = path?;
    let Json(draft) = payload?;
    let owner = Owner::from(&user);

    let draft = prepare(&state, owner, draft).await?;
    let diary = state.stores.diaries.update(owner, id, draft).await?;
    info!("Diary updated: id={}, user_id={}", diary.id, owner.id());

    let mut views = with_files(&state, owner, vec![diary]).await?;
    views
        .pop()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Diary not found"))
}

pub async fn diary_delete(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    let owner = Owner::from(&user);

    state.stores.diaries.delete(owner, id).await?;
    info!("Diary deleted: id={}, user_id={}", id, owner.id());
    Ok(StatusCode::NO_CONTENT)
}
