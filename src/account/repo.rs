use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use super::repo_types::{Account, NewAccount};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The `user_id` unique constraint rejected the write.
    #[error("user_id already exists")]
    Duplicate,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    fn from_insert(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
            _ => StoreError::Database(e),
        }
    }
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts a new account. Uniqueness is enforced by the store itself.
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError>;
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Account>, StoreError>;
    async fn count(&self) -> Result<i64, StoreError>;
}

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let NewAccount {
            user_id,
            password_hash,
            company_id,
            profile,
        } = account;

        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO auth (
                user_id, user_pw, company_id, industry, bs_num,
                company_add, company_country, manager_dept,
                manager_name, manager_email, manager_phone
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING user_id, user_pw, company_id, industry, bs_num,
                      company_add, company_country, manager_dept,
                      manager_name, manager_email, manager_phone, created_at
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .bind(company_id)
        .bind(profile.industry)
        .bind(profile.bs_num)
        .bind(profile.company_add)
        .bind(profile.company_country)
        .bind(profile.manager_dept)
        .bind(profile.manager_name)
        .bind(profile.manager_email)
        .bind(profile.manager_phone)
        .fetch_one(&self.db)
        .await
        .map_err(StoreError::from_insert)
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT user_id, user_pw, company_id, industry, bs_num,
                   company_add, company_country, manager_dept,
                   manager_name, manager_email, manager_phone, created_at
            FROM auth
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(account)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM auth")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }
}
