use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Optional company/manager attributes collected at signup. Stored as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ProfileFields {
    pub industry: Option<String>,
    pub bs_num: Option<String>,
    pub company_add: Option<String>,
    pub company_country: Option<String>,
    pub manager_dept: Option<String>,
    pub manager_name: Option<String>,
    pub manager_email: Option<String>,
    pub manager_phone: Option<String>,
}

/// Row of the `auth` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Account {
    pub user_id: String,
    #[serde(skip_serializing)]
    #[sqlx(rename = "user_pw")]
    pub password_hash: String,        // Argon2 PHC string, not exposed in JSON
    pub company_id: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub profile: ProfileFields,
    pub created_at: OffsetDateTime,
}

/// Values for a fresh insert; the hash is computed before this is built.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user_id: String,
    pub password_hash: String,
    pub company_id: String,
    pub profile: ProfileFields,
}
