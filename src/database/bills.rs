use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::manager::found;
use super::models::{group_by_record, Attachment, Bill, BillFilter, LinkedAttachment, NewBill};
use super::{DatabaseError, Owner};

/// Owner-scoped bill storage. Every method filters on the owner's id.
#[async_trait]
pub trait BillRepository: Send + Sync {
    async fn create(&self, owner: Owner, bill: NewBill) -> Result<Bill, DatabaseError>;
    async fn get(&self, owner: Owner, id: i32) -> Result<Bill, DatabaseError>;
    /// Newest first.
    async fn list(&self, owner: Owner, filter: &BillFilter) -> Result<Vec<Bill>, DatabaseError>;
    async fn update(&self, owner: Owner, id: i32, bill: NewBill) -> Result<Bill, DatabaseError>;
    async fn delete(&self, owner: Owner, id: i32) -> Result<(), DatabaseError>;
    /// Attachments of the given bills, keyed by bill id. Foreign ids yield nothing.
    async fn attachments(&self, owner: Owner, ids: &[i32]) -> Result<HashMap<i32, Vec<Attachment>>, DatabaseError>;
}

const BILL_COLUMNS: &str = "id, user_id, original_amount, discount_amount, actual_amount, \
     discount_type, payment_method, category, notes, related_diary_id, created_at, updated_at";

pub struct PgBillRepository {
    pool: PgPool,
}

impl PgBillRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BillRepository for PgBillRepository {
    async fn create(&self, owner: Owner, bill: NewBill) -> Result<Bill, DatabaseError> {
        let query = format!(
            r#"
            INSERT INTO bills (user_id, original_amount, discount_amount, actual_amount,
                discount_type, payment_method, category, notes, related_diary_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW())
            RETURNING {}
            "#,
            BILL_COLUMNS
        );

        let created = sqlx::query_as::<_, Bill>(&query)
            .bind(owner.id())
            .bind(bill.amount.original_amount)
            .bind(bill.amount.discount_amount)
            .bind(bill.amount.actual_amount)
            .bind(bill.discount_type)
            .bind(bill.payment_method)
            .bind(bill.category)
            .bind(bill.notes)
            .bind(bill.related_diary_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn get(&self, owner: Owner, id: i32) -> Result<Bill, DatabaseError> {
        let query = format!("SELECT {} FROM bills WHERE id = $1 AND user_id = $2", BILL_COLUMNS);

        let row = sqlx::query_as::<_, Bill>(&query)
            .bind(id)
            .bind(owner.id())
            .fetch_optional(&self.pool)
            .await?;
        found(row, "Bill")
    }

    async fn list(&self, owner: Owner, filter: &BillFilter) -> Result<Vec<Bill>, DatabaseError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM bills WHERE user_id = ", BILL_COLUMNS));
        query.push_bind(owner.id());

        if let Some(category) = &filter.category {
            query.push(" AND category = ").push_bind(category);
        }
        if let Some(payment_method) = &filter.payment_method {
            query.push(" AND payment_method = ").push_bind(payment_method);
        }
        if let Some(month) = &filter.month {
            query.push(" AND TO_CHAR(created_at, 'YYYY-MM') = ").push_bind(month);
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let bills = query.build_query_as::<Bill>().fetch_all(&self.pool).await?;
        Ok(bills)
    }

    async fn update(&self, owner: Owner, id: i32, bill: NewBill) -> Result<Bill, DatabaseError> {
        let query = format!(
            r#"
            UPDATE bills
            SET original_amount = $1, discount_amount = $2, actual_amount = $3,
                discount_type = $4, payment_method = $5, category = $6, notes = $7,
                related_diary_id = $8, updated_at = NOW()
            WHERE id = $9 AND user_id = $10
            RETURNING {}
            "#,
            BILL_COLUMNS
        );

        let row = sqlx::query_as::<_, Bill>(&query)
            .bind(bill.amount.original_amount)
            .bind(bill.amount.discount_amount)
            .bind(bill.amount.actual_amount)
            .bind(bill.discount_type)
            .bind(bill.payment_method)
            .bind(bill.category)
            .bind(bill.notes)
            .bind(bill.related_diary_id)
            .bind(id)
            .bind(owner.id())
            .fetch_optional(&self.pool)
            .await?;
        found(row, "Bill")
    }

    async fn delete(&self, owner: Owner, id: i32) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM bills WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner.id())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Bill not found".to_string()));
        }
        Ok(())
    }

    async fn attachments(&self, owner: Owner, ids: &[i32]) -> Result<HashMap<i32, Vec<Attachment>>, DatabaseError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let query = r#"
            SELECT bf.bill_id AS record_id, f.id, f.file_type, f.file_url, f.created_at
            FROM files f
            INNER JOIN bill_files bf ON f.id = bf.file_id
            INNER JOIN bills b ON b.id = bf.bill_id
            WHERE bf.bill_id = ANY($1) AND b.user_id = $2
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
