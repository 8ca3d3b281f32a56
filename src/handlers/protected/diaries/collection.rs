use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use tracing::info;

use super::{prepare, with_files};
use crate::database::models::{DiaryFilter, DiaryView, NewDiary};
use crate::database::Owner;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// GET /diaries - The caller's diary entries, newest first
///
/// Optional query filters: `tag`, `mood`.
pub async fn diaries_get(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<DiaryFilter>, QueryRejection>,
) -> Result<Json<Vec<DiaryView>>, ApiError> {
    let Query(filter) = query?;
    let filter = filter.normalized();

    let owner = Owner::from(&user);
    let diaries = state.stores.diaries.list(owner, &filter).await?;
    Ok(Json(with_files(&state, owner, diaries).await?))
}

/// POST /diaries
pub async fn diaries_post(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<NewDiary>, JsonRejection>,
) -> Result<(StatusCode, Json<DiaryView>), ApiError> {
    let Json(draft) = payload?;
    let owner = Owner::from(&user);

    let draft = prepare(&state, owner, draft).await?;
    let diary = state.stores.diaries.create(owner, draft).await?;
    info!("Diary created: id={}, user_id={}", diary.id, owner.id());

    Ok((StatusCode::CREATED, Json(DiaryView::new(diary, Vec::new()))))
}
