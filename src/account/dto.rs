use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::{Account, ProfileFields};

/// Request body for signup. Profile fields are optional.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub user_id: String,
    pub user_pw: String,
    pub company_id: String,
    #[serde(flatten)]
    pub profile: ProfileFields,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub user_id: String,
    pub user_pw: String,
}

/// Returned after signup or login.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountResponse {
    pub status: String,
    pub message: String,
    pub user_id: String,
    pub company_id: String,
}

impl AccountResponse {
    pub fn success(message: &str, account: &Account) -> Self {
        Self {
            status: "success".into(),
            message: message.into(),
            user_id: account.user_id.clone(),
            company_id: account.company_id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

/// Public view of an account for `/profile`.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub company_id: String,
    #[serde(flatten)]
    pub profile: ProfileFields,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Account> for ProfileResponse {
    fn from(a: Account) -> Self {
        Self {
            user_id: a.user_id,
            company_id: a.company_id,
            profile: a.profile,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DbHealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub auth_table_count: i64,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub endpoints: &'static [&'static str],
}
