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
use crate::database::models::{BillFilter, BillView, NewBill};
use crate::database::Owner;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// GET /bills - The caller's bills, newest first
///
/// Optional query filters: `category`, `payment_method`, `month=YYYY-MM`.
pub async fn bills_get(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<BillFilter>, QueryRejection>,
) -> Result<Json<Vec<BillView>>, ApiError> {
    let Query(filter) = query?;
    let filter = filter.normalized();
    filter
        .validate()
        .map_err(|fields| ApiError::validation_error("Invalid filter", Some(fields)))?;

    let owner = Owner::from(&user);
    let bills = state.stores.bills.list(owner, &filter).await?;
    Ok(Json(with_files(&state, owner, bills).await?))
}

/// POST /bills - Record a new bill for the caller
pub async fn bills_post(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<NewBill>, JsonRejection>,
) -> Result<(StatusCode, Json<BillView>), ApiError> {
    let Json(draft) = payload?;
    let owner = Owner::from(&user);

    let draft = prepare(&state, owner, draft).await?;
    let bill = state.stores.bills.create(owner, draft).await?;
    info!("Bill created: id={}, user_id={}", bill.id, owner.id());

    Ok((StatusCode::CREATED, Json(BillView::new(bill, Vec::new()))))
}
