use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A stored file (image, audio or video) linked to a bill or diary entry.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Attachment {
    pub id: i32,
    pub file_type: String,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
}

/// Attachment row tagged with the id of the record it belongs to.
#[derive(Debug, Clone, FromRow)]
pub struct LinkedAttachment {
    pub record_id: i32,
    pub id: i32,
    pub file_type: String,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
}

/// Buckets attachment rows by owning record id, keeping row order.
pub fn group_by_record(rows: Vec<LinkedAttachment>) -> HashMap<i32, Vec<Attachment>> {
    let mut grouped: HashMap<i32, Vec<Attachment>> = HashMap::new();
    for row in rows {
        grouped.entry(row.record_id).or_default().push(Attachment {
            id: row.id,
            file_type: row.file_type,
            file_url: row.file_url,
            created_at: row.created_at,
        });
    }
    grouped
}
