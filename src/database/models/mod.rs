pub mod attachment;
pub mod bill;
pub mod diary;
pub mod user;

pub use attachment::{group_by_record, Attachment, LinkedAttachment};
pub use bill::{Amount, Bill, BillFilter, BillView, NewBill};
pub use diary::{Diary, DiaryFilter, DiaryView, NewDiary};
pub use user::{User, UserProfile};

pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
