//! In-memory stores and state builders for handler and session tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::database::models::{
    Attachment, Bill, BillFilter, Diary, DiaryFilter, NewBill, NewDiary, User,
};
use crate::database::{BillRepository, DatabaseError, DiaryRepository, Owner, Stores, UserDirectory};
use crate::state::AppState;

pub const TEST_SECRET: &str = "test-suite-secret";

#[derive(Default)]
pub struct MemoryUsers {
    users: Mutex<HashMap<i32, User>>,
    failing: AtomicBool,
}

impl MemoryUsers {
    pub fn insert(&self, id: i32, username: &str, email: &str, password_hash: &str, status: &str) {
        let now = Utc::now();
        let user = User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            phone: None,
            avatar_url: None,
            role: "user".to_string(),
            status: status.to_string(),
            disabled_reason: None,
            disabled_at: None,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().insert(id, user);
    }

    pub fn set_role(&self, id: i32, role: &str) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.role = role.to_string();
        }
    }

    pub fn set_status(&self, id: i32, status: &str) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.status = status.to_string();
        }
    }

    pub fn remove(&self, id: i32) {
        self.users.lock().unwrap().remove(&id);
    }

    /// Makes every lookup fail as if the database were unreachable.
    pub fn fail_lookups(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn find(&self, matches: impl Fn(&User) -> bool) -> Result<Option<User>, DatabaseError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(self.users.lock().unwrap().values().find(|u| matches(u)).cloned())
    }
}

#[async_trait]
impl UserDirectory for MemoryUsers {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        self.find(|u| u.username == username)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        self.find(|u| u.email == email)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DatabaseError> {
        self.find(|u| u.id == id)
    }
}

/// Attachments keyed by the record they hang off.
#[derive(Default)]
struct Files {
    rows: Mutex<Vec<(i32, Attachment)>>,
}

impl Files {
    fn attach(&self, record_id: i32, file_type: &str, file_url: &str) {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i32 + 1;
        rows.push((
            record_id,
            Attachment {
                id,
                file_type: file_type.to_string(),
                file_url: file_url.to_string(),
                created_at: Utc::now(),
            },
        ));
    }

    fn for_records(&self, ids: &[i32], visible: impl Fn(i32) -> bool) -> HashMap<i32, Vec<Attachment>> {
        let mut grouped: HashMap<i32, Vec<Attachment>> = HashMap::new();
        for (record_id, file) in self.rows.lock().unwrap().iter() {
            if ids.contains(record_id) && visible(*record_id) {
                grouped.entry(*record_id).or_default().push(file.clone());
            }
        }
        grouped
    }
}

fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i32)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[derive(Default)]
pub struct MemoryBills {
    rows: Mutex<Vec<Bill>>,
    files: Files,
}

impl MemoryBills {
    pub fn attach(&self, bill_id: i32, file_type: &str, file_url: &str) {
        self.files.attach(bill_id, file_type, file_url);
    }

    fn owned_by(&self, owner: Owner, id: i32) -> bool {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .any(|b| b.id == id && b.user_id == owner.id())
    }
}

#[async_trait]
impl BillRepository for MemoryBills {
    async fn create(&self, owner: Owner, bill: NewBill) -> Result<Bill, DatabaseError> {
        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();
        let created = Bill {
            id: rows.iter().map(|b| b.id).max().unwrap_or(0) + 1,
            user_id: owner.id(),
            original_amount: bill.amount.original_amount,
            discount_amount: bill.amount.discount_amount,
            actual_amount: bill.amount.actual_amount,
            discount_type: bill.discount_type,
            payment_method: bill.payment_method,
            category: bill.category,
            notes: bill.notes,
            related_diary_id: bill.related_diary_id,
            created_at: now,
            updated_at: now,
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn get(&self, owner: Owner, id: i32) -> Result<Bill, DatabaseError> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id && b.user_id == owner.id())
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound("Bill not found".to_string()))
    }

    async fn list(&self, owner: Owner, filter: &BillFilter) -> Result<Vec<Bill>, DatabaseError> {
        let mut bills: Vec<Bill> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.user_id == owner.id())
            .filter(|b| filter.category.is_none() || b.category == filter.category)
            .filter(|b| filter.payment_method.as_ref().map_or(true, |m| &b.payment_method == m))
            .filter(|b| {
                filter
                    .month
                    .as_ref()
                    .map_or(true, |m| &b.created_at.format("%Y-%m").to_string() == m)
            })
            .cloned()
            .collect();
        newest_first(&mut bills, |b| (b.created_at, b.id));
        Ok(bills)
    }

    async fn update(&self, owner: Owner, id: i32, bill: NewBill) -> Result<Bill, DatabaseError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|b| b.id == id && b.user_id == owner.id())
            .ok_or_else(|| DatabaseError::NotFound("Bill not found".to_string()))?;

        row.original_amount = bill.amount.original_amount;
        row.discount_amount = bill.amount.discount_amount;
        row.actual_amount = bill.amount.actual_amount;
        row.discount_type = bill.discount_type;
        row.payment_method = bill.payment_method;
        row.category = bill.category;
        row.notes = bill.notes;
        row.related_diary_id = bill.related_diary_id;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, owner: Owner, id: i32) -> Result<(), DatabaseError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|b| !(b.id == id && b.user_id == owner.id()));
        if rows.len() == before {
            return Err(DatabaseError::NotFound("Bill not found".to_string()));
        }
        Ok(())
    }

    async fn attachments(&self, owner: Owner, ids: &[i32]) -> Result<HashMap<i32, Vec<Attachment>>, DatabaseError> {
        Ok(self.files.for_records(ids, |id| self.owned_by(owner, id)))
    }
}

#[derive(Default)]
pub struct MemoryDiaries {
    rows: Mutex<Vec<Diary>>,
    files: Files,
}

impl MemoryDiaries {
    pub fn attach(&self, diary_id: i32, file_type: &str, file_url: &str) {
        self.files.attach(diary_id, file_type, file_url);
    }

    fn owned_by(&self, owner: Owner, id: i32) -> bool {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .any(|d| d.id == id && d.user_id == owner.id())
    }
}

#[async_trait]
impl DiaryRepository for MemoryDiaries {
    async fn create(&self, owner: Owner, diary: NewDiary) -> Result<Diary, DatabaseError> {
        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();
        let created = Diary {
            id: rows.iter().map(|d| d.id).max().unwrap_or(0) + 1,
            user_id: owner.id(),
            content: diary.content,
            mood: diary.mood,
            tags: diary.tags,
            related_bill_id: diary.related_bill_id,
            created_at: now,
            updated_at: now,
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn get(&self, owner: Owner, id: i32) -> Result<Diary, DatabaseError> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id && d.user_id == owner.id())
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound("Diary not found".to_string()))
    }

    async fn list(&self, owner: Owner, filter: &DiaryFilter) -> Result<Vec<Diary>, DatabaseError> {
        let mut diaries: Vec<Diary> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.user_id == owner.id())
            .filter(|d| filter.tag.as_ref().map_or(true, |t| d.tags.contains(t)))
            .filter(|d| filter.mood.is_none() || d.mood == filter.mood)
            .cloned()
            .collect();
        newest_first(&mut diaries, |d| (d.created_at, d.id));
        Ok(diaries)
    }

    async fn update(&self, owner: Owner, id: i32, diary: NewDiary) -> Result<Diary, DatabaseError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|d| d.id == id && d.user_id == owner.id())
            .ok_or_else(|| DatabaseError::NotFound("Diary not found".to_string()))?;

        row.content = diary.content;
        row.mood = diary.mood;
        row.tags = diary.tags;
        row.related_bill_id = diary.related_bill_id;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, owner: Owner, id: i32) -> Result<(), DatabaseError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|d| !(d.id == id && d.user_id == owner.id()));
        if rows.len() == before {
            return Err(DatabaseError::NotFound("Diary not found".to_string()));
        }
        Ok(())
    }

    async fn attachments(&self, owner: Owner, ids: &[i32]) -> Result<HashMap<i32, Vec<Attachment>>, DatabaseError> {
        Ok(self.files.for_records(ids, |id| self.owned_by(owner, id)))
    }
}

/// Configuration with a fixed secret and short token lifetimes.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.security.jwt_secret = TEST_SECRET.to_string();
    config.security.access_token_ttl_secs = 300;
    config.security.refresh_token_ttl_secs = 3600;
    config.security.cors_origins = Vec::new();
    config
}

/// Application state over in-memory stores, with handles kept for seeding.
pub struct TestApp {
    pub state: AppState,
    pub users: Arc<MemoryUsers>,
    pub bills: Arc<MemoryBills>,
    pub diaries: Arc<MemoryDiaries>,
}

impl TestApp {
    pub fn new() -> Self {
        let users = Arc::new(MemoryUsers::default());
        let bills = Arc::new(MemoryBills::default());
        let diaries = Arc::new(MemoryDiaries::default());

        let stores = Stores {
            users: users.clone(),
            bills: bills.clone(),
            diaries: diaries.clone(),
            pool: None,
        };
        let state = AppState::new(test_config(), stores).unwrap();

        Self {
            state,
            users,
            bills,
            diaries,
        }
    }
}
