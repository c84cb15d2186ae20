//! In-process `AccountStore` used by the test suites.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use super::repo::{AccountStore, StoreError};
use super::repo_types::{Account, NewAccount};

#[derive(Default)]
pub struct MemoryAccountStore {
    rows: Mutex<HashMap<String, Account>>,
    failing: AtomicBool,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail as if the pool were unreachable.
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub async fn get(&self, user_id: &str) -> Option<Account> {
        self.rows.lock().await.get(user_id).cloned()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        self.check()?;
        let mut rows = self.rows.lock().await;
        if rows.contains_key(&account.user_id) {
            return Err(StoreError::Duplicate);
        }
        let row = Account {
            user_id: account.user_id.clone(),
            password_hash: account.password_hash,
            company_id: account.company_id,
            profile: account.profile,
            created_at: OffsetDateTime::now_utc(),
        };
        rows.insert(account.user_id, row.clone());
        Ok(row)
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Account>, StoreError> {
        self.check()?;
        Ok(self.rows.lock().await.get(user_id).cloned())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        self.check()?;
        Ok(self.rows.lock().await.len() as i64)
    }
}
