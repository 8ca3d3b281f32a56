use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{blank_to_none, Attachment};

pub const MOOD_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

#[derive(Debug, Clone, FromRow)]
pub struct Diary {
    pub id: i32,
    pub user_id: i32,
    pub content: String,
    pub mood: Option<i32>,
    pub tags: Vec<String>,
    pub related_bill_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDiary {
    pub content: String,
    #[serde(default)]
    pub mood: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub related_bill_id: Option<i32>,
}

impl NewDiary {
    /// Drops blank and duplicate tags; a zero mood or id means "not set".
    pub fn normalized(mut self) -> Self {
        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        self.tags = tags;
        self.mood = self.mood.filter(|m| *m != 0);
        self.related_bill_id = self.related_bill_id.filter(|id| *id > 0);
        self
    }

    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        let mut errors = HashMap::new();
        if self.content.trim().is_empty() {
            errors.insert("content".to_string(), "This field is required".to_string());
        }
        if let Some(mood) = self.mood {
            if !MOOD_RANGE.contains(&mood) {
                errors.insert(
                    "mood".to_string(),
                    format!("Must be between {} and {}", MOOD_RANGE.start(), MOOD_RANGE.end()),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiaryFilter {
    pub tag: Option<String>,
    pub mood: Option<i32>,
}

impl DiaryFilter {
    pub fn normalized(self) -> Self {
        Self {
            tag: blank_to_none(self.tag),
            mood: self.mood.filter(|m| *m != 0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiaryView {
    pub id: i32,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<i32>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_bill_id: Option<i32>,
    pub files: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiaryView {
    pub fn new(diary: Diary, files: Vec<Attachment>) -> Self {
        Self {
            id: diary.id,
            content: diary.content,
            mood: diary.mood,
            tags: diary.tags,
            related_bill_id: diary.related_bill_id,
            files,
            created_at: diary.created_at,
            updated_at: diary.updated_at,
        }
    }
}
