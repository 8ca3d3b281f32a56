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
use crate::database::models::{BillView, NewBill};
use crate::database::Owner;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// GET /bills/:id
pub async fn bill_get(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<BillView>, ApiError> {
    let Path(id) = path?;
    let owner = Owner::from(&user);

    let bill = state.stores.bills.get(owner, id).await?;
    let mut views = with_files(&state, owner, vec![bill]).await?;
    views
        .pop()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Bill not found"))
}

/// PUT /bills/:id - Replace every mutable field of a bill
pub async fn bill_put(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<NewBill>, JsonRejection>,
) -> Result<Json<BillView>, ApiError> {
    let Path(id) = path?;
    let Json(draft) = payload?;
    let owner = Owner::from(&user);

    let draft = prepare(&state, owner, draft).await?;
    let bill = state.stores.bills.update(owner, id, draft).await?;
    info!("Bill updated: id={}, user_id={}", bill.id, owner.id());

    let mut views = with_files(&state, owner, vec![bill]).await?;
    views
        .pop()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Bill not found"))
}

/// DELETE /bills/:id
pub async fn bill_delete(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    let owner = Owner::from(&user);

    state.stores.bills.delete(owner, id).await?;
    info!("Bill deleted: id={}, user_id={}", id, owner.id());
    Ok(StatusCode::NO_CONTENT)
}
