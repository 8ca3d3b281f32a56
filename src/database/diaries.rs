use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::manager::found;
use super::models::{group_by_record, Attachment, Diary, DiaryFilter, LinkedAttachment, NewDiary};
use super::{DatabaseError, Owner};

/// Owner-scoped diary storage. Every method filters on the owner's id.
#[async_trait]
pub trait DiaryRepository: Send + Sync {
    async fn create(&self, owner: Owner, diary: NewDiary) -> Result<Diary, DatabaseError>;
    async fn get(&self, owner: Owner, id: i32) -> Result<Diary, DatabaseError>;
    async fn list(&self, owner: Owner, filter: &DiaryFilter) -> Result<Vec<Diary>, DatabaseError>;
    async fn update(&self, owner: Owner, id: i32, diary: NewDiary) -> Result<Diary, DatabaseError>;
    async fn delete(&self, owner: Owner, id: i32) -> Result<(), DatabaseError>;
    async fn attachments(&self, owner: Owner, ids: &[i32]) -> Result<HashMap<i32, Vec<Attachment>>, DatabaseError>;
}

const DIARY_COLUMNS: &str = "id, user_id, content, mood, tags, related_bill_id, created_at, updated_at";

pub struct PgDiaryRepository {
    pool: PgPool,
}

impl PgDiaryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DiaryRepository for PgDiaryRepository {
    async fn create(&self, owner: Owner, diary: NewDiary) -> Result<Diary, DatabaseError> {
        let query = format!(
            r#"
            INSERT INTO diaries (user_id, content, mood, tags, related_bill_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING {}
            "#,
            DIARY_COLUMNS
        );

        let created = sqlx::query_as::<_, Diary>(&query)
            .bind(owner.id())
            .bind(diary.content)
            .bind(diary.mood)
            .bind(diary.tags)
            .bind(diary.related_bill_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn get(&self, owner: Owner, id: i32) -> Result<Diary, DatabaseError> {
        let query = format!("SELECT {} FROM diaries WHERE id = $1 AND user_id = $2", DIARY_COLUMNS);

        let row = sqlx::query_as::<_, Diary>(&query)
            .bind(id)
            .bind(owner.id())
            .fetch_optional(&self.pool)
            .await?;
        found(row, "Diary")
    }

    async fn list(&self, owner: Owner, filter: &DiaryFilter) -> Result<Vec<Diary>, DatabaseError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM diaries WHERE user_id = ", DIARY_COLUMNS));
        query.push_bind(owner.id());

        if let Some(tag) = &filter.tag {
            query.push(" AND ").push_bind(tag).push(" = ANY(tags)");
        }
        if let Some(mood) = filter.mood {
            query.push(" AND mood = ").push_bind(mood);
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let diaries = query.build_query_as::<Diary>().fetch_all(&self.pool).await?;
        Ok(diaries)
    }

    async fn update(&self, owner: Owner, id: i32, diary: NewDiary) -> Result<Diary, DatabaseError> {
        let query = format!(
            r#"
            UPDATE diaries
            SET content = $1, mood = $2, tags = $3, related_bill_id = $4, updated_at = NOW()
            WHERE id = $5 AND user_id = $6
            RETURNING {}
            "#,
            DIARY_COLUMNS
        );

        let row = sqlx::query_as::<_, Diary>(&query)
            .bind(diary.content)
            .bind(diary.mood)
            .bind(diary.tags)
            .bind(diary.related_bill_id)
            .bind(id)
            .bind(owner.id())
            .fetch_optional(&self.pool)
            .await?;
        found(row, "Diary")
    }

    async fn delete(&self, owner: Owner, id: i32) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM diaries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner.id())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Diary not found".to_string()));
        }
        Ok(())
    }

    async fn attachments(&self, owner: Owner, ids: &[i32]) -> Result<HashMap<i32, Vec<Attachment>>, DatabaseError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let query = r#"
            SELECT df.diary_id AS record_id, f.id, f.file_type, f.file_url, f.created_at
            FROM files f
            INNER JOIN diary_files df ON f.id = df.file_id
            INNER JOIN diaries d ON d.id = df.diary_id
            WHERE df.diary_id = ANY($1) AND d.user_id = $2
            ORDER BY f.id
        "#;

        let rows = sqlx::query_as::<_, LinkedAttachment>(query)
            .bind(ids)
            .bind(owner.id())
            .fetch_all(&self.pool)
            .await?;
        Ok(group_by_record(rows))
    }
}
