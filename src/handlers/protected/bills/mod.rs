// handlers/protected/bills - /bills and /bills/:id
//
// Every storage call is scoped with the caller's Owner; a bill id belonging
// to someone else reads as 404.

pub mod collection; // GET/POST /bills
pub mod record; // GET/PUT/DELETE /bills/:id

pub use collection::{bills_get, bills_post};
pub use record::{bill_delete, bill_get, bill_put};

use crate::database::models::{Bill, BillView, NewBill};
use crate::database::{DatabaseError, Owner};
use crate::error::ApiError;
use crate::state::AppState;

/// Normalizes and validates a bill body. A linked diary must be the caller's own.
async fn prepare(state: &AppState, owner: Owner, draft: NewBill) -> Result<NewBill, ApiError> {
    let draft = draft.normalized();
    draft
        .validate()
        .map_err(|fields| ApiError::validation_error("Invalid bill", Some(fields)))?;

    if let Some(diary_id) = draft.related_diary_id {
        match state.stores.diaries.get(owner, diary_id).await {
            Ok(_) => {}
            Err(DatabaseError::NotFound(_)) => return Err(ApiError::bad_request("Related diary not found")),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(draft)
}

async fn with_files(state: &AppState, owner: Owner, bills: Vec<Bill>) -> Result<Vec<BillView>, ApiError> {
    let ids: Vec<i32> = bills.iter().map(|bill| bill.id).collect();
    let mut files = state.stores.bills.attachments(owner, &ids).await?;

    Ok(bills
        .into_iter()
        .map(|bill| {
            let attached = files.remove(&bill.id).unwrap_or_default();
            BillView::new(bill, attached)
        })
        .collect())
}
