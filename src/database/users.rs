use async_trait::async_trait;
use sqlx::PgPool;

use super::models::User;
use super::DatabaseError;

/// Read access to user accounts for authentication.
///
/// Lookups return `Ok(None)` for unknown accounts and reserve `Err` for
/// infrastructure failures.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DatabaseError>;
}

pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let query = r#"
            SELECT id, username, email, password_hash, phone, avatar_url,
                   role, status, disabled_reason, disabled_at, created_at, updated_at
            FROM users
            WHERE username = $1
        "#;

        let user = sqlx::query_as::<_, User>(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let query = r#"
            SELECT id, username, email, password_hash, phone, avatar_url,
                   role, status, disabled_reason, disabled_at, created_at, updated_at
            FROM users
            WHERE email = $1
        "#;

        let user = sqlx::query_as::<_, User>(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DatabaseError> {
        let query = r#"
            SELECT id, username, email, password_hash, phone, avatar_url,
                   role, status, disabled_reason, disabled_at, created_at, updated_at
            FROM users
            WHERE id = $1
        "#;

        let user = sqlx::query_as::<_, User>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
