// handlers/protected/diaries - /diaries and /diaries/:id

pub mod collection; // GET/POST /diaries
pub mod record; // GET/PUT/DELETE /diaries/:id

pub use collection::{diaries_get, diaries_post};
pub use record::{diary_delete, diary_get, diary_put};

use crate::database::models::{Diary, DiaryView, NewDiary};
use crate::database::{DatabaseError, Owner};
use crate::error::ApiError;
use crate::state::AppState;

/// Normalizes and validates a diary body. A linked bill must be the caller's own.
async fn prepare(state: &AppState, owner: Owner, draft: NewDiary) -> Result<NewDiary, ApiError> {
    let draft = draft.normalized();
    draft
        .validate()
        .map_err(|fields| ApiError::validation_error("Invalid diary", Some(fields)))?;

    if let Some(bill_id) = draft.related_bill_id {
        match state.stores.bills.get(owner, bill_id).await {
            Ok(_) => {}
            Err(DatabaseError::NotFound(_)) => return Err(ApiError::bad_request("Related bill not found")),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(draft)
}

async fn with_files(state: &AppState, owner: Owner, diaries: Vec<Diary>) -> Result<Vec<DiaryView>, ApiError> {
    let ids: Vec<i32> = diaries.iter().map(|diary| diary.id).collect();
    let mut files = state.stores.diaries.attachments(owner, &ids).await?;

    Ok(diaries
        .into_iter()
        .map(|diary| {
            let attached = files.remove(&diary.id).unwrap_or_default();
            DiaryView::new(diary, attached)
        })
        .collect())
}
