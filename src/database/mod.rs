pub mod bills;
pub mod diaries;
pub mod manager;
pub mod models;
pub mod ownership;
pub mod users;

use std::sync::Arc;

use sqlx::PgPool;

pub use bills::{BillRepository, PgBillRepository};
pub use diaries::{DiaryRepository, PgDiaryRepository};
pub use manager::{connect, health_check, DatabaseError};
pub use ownership::Owner;
pub use users::{PgUserDirectory, UserDirectory};

/// Storage collaborators shared by the router and the session manager.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserDirectory>,
    pub bills: Arc<dyn BillRepository>,
    pub diaries: Arc<dyn DiaryRepository>,
    /// Present when backed by PostgreSQL; used by the health check.
    pub pool: Option<PgPool>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserDirectory::new(pool.clone())),
            bills: Arc::new(PgBillRepository::new(pool.clone())),
            diaries: Arc::new(PgDiaryRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }
}
