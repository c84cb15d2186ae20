use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use super::{
    dto::{LoginRequest, SignupRequest},
    error::AccountError,
    password::{hash_password_blocking, verify_password_blocking},
    repo::{AccountStore, StoreError},
    repo_types::{Account, NewAccount},
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn require(field: &str, value: &str) -> Result<(), AccountError> {
    if value.trim().is_empty() {
        return Err(AccountError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Hashes the password and inserts the row. A duplicate `user_id` is
/// reported by the store's unique constraint, never by a prior lookup.
pub async fn signup(store: &dyn AccountStore, req: SignupRequest) -> Result<Account, AccountError> {
    require("user_id", &req.user_id)?;
    require("user_pw", &req.user_pw)?;
    require("company_id", &req.company_id)?;
    if let Some(email) = req.profile.manager_email.as_deref() {
        if !email.is_empty() && !is_valid_email(email) {
            warn!(user_id = %req.user_id, "invalid manager_email");
            return Err(AccountError::Validation("manager_email is not a valid email".into()));
        }
    }

    let password_hash = hash_password_blocking(req.user_pw).await.map_err(|e| {
        error!(error = %e, "hash_password failed");
        AccountError::Internal(e)
    })?;

    let new = NewAccount {
        user_id: req.user_id,
        password_hash,
        company_id: req.company_id,
        profile: req.profile,
    };
    let user_id = new.user_id.clone();

    match store.insert(new).await {
        Ok(account) => {
            info!(user_id = %account.user_id, company_id = %account.company_id, "account created");
            Ok(account)
        }
        Err(StoreError::Duplicate) => {
            warn!(%user_id, "signup for existing user_id");
            Err(AccountError::Conflict)
        }
        Err(e) => {
            error!(error = %e, %user_id, "insert account failed");
            Err(AccountError::Storage(e))
        }
    }
}

/// Unknown user and wrong password are indistinguishable to the caller,
/// both in the error and in the time spent.
pub async fn login(store: &dyn AccountStore, req: LoginRequest) -> Result<Account, AccountError> {
    let account = store.find_by_user_id(&req.user_id).await.map_err(|e| {
        error!(error = %e, user_id = %req.user_id, "find_by_user_id failed");
        AccountError::Storage(e)
    })?;

    let stored_hash = account.as_ref().map(|a| a.password_hash.clone());
    let ok = verify_password_blocking(req.user_pw, stored_hash)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %req.user_id, "verify_password failed");
            AccountError::Internal(e)
        })?;

    match account {
        Some(account) if ok => {
            info!(user_id = %account.user_id, "login succeeded");
            Ok(account)
        }
        Some(_) => {
            warn!(user_id = %req.user_id, "login invalid password");
            Err(AccountError::InvalidCredentials)
        }
        None => {
            warn!(user_id = %req.user_id, "login unknown user_id");
            Err(AccountError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{memory::MemoryAccountStore, repo_types::ProfileFields};

    fn signup_req(user_id: &str, pw: &str, company: &str) -> SignupRequest {
        SignupRequest {
            user_id: user_id.into(),
            user_pw: pw.into(),
            company_id: company.into(),
            profile: ProfileFields::default(),
        }
    }

    fn login_req(user_id: &str, pw: &str) -> LoginRequest {
        LoginRequest {
            user_id: user_id.into(),
            user_pw: pw.into(),
        }
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("kim@acme.co.kr"));
        assert!(!is_valid_email("kim@acme"));
        assert!(!is_valid_email("not an email"));
    }

    #[tokio::test]
    async fn signup_stores_hash_not_plaintext() {
        let store = MemoryAccountStore::new();
        let account = signup(&store, signup_req("alice", "secret123", "acme"))
            .await
            .unwrap();
        assert_eq!(account.user_id, "alice");
        assert_eq!(account.company_id, "acme");
        assert_ne!(account.password_hash, "secret123");
        assert!(account.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn duplicate_signup_conflicts_and_keeps_first_row() {
        let store = MemoryAccountStore::new();
        signup(&store, signup_req("alice", "secret123", "acme")).await.unwrap();
        let before = store.get("alice").await.unwrap();

        let err = signup(&store, signup_req("alice", "other-pw", "evil-corp"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Conflict));

        let after = store.get("alice").await.unwrap();
        assert_eq!(after.company_id, "acme");
        assert_eq!(after.password_hash, before.password_hash);
        assert_eq!(after.created_at, before.created_at);
        assert!(login(&store, login_req("alice", "secret123")).await.is_ok());
        assert!(login(&store, login_req("alice", "other-pw")).await.is_err());
    }

    #[tokio::test]
    async fn signup_validates_required_fields() {
        let store = MemoryAccountStore::new();
        for req in [
            signup_req("", "pw", "acme"),
            signup_req("bob", "", "acme"),
            signup_req("bob", "pw", "  "),
        ] {
            let err = signup(&store, req).await.unwrap_err();
            assert!(matches!(err, AccountError::Validation(_)));
        }

        let mut req = signup_req("bob", "pw", "acme");
        req.profile.manager_email = Some("bob-at-acme".into());
        assert!(matches!(
            signup(&store, req).await.unwrap_err(),
            AccountError::Validation(_)
        ));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn signup_keeps_profile_fields() {
        let store = MemoryAccountStore::new();
        let mut req = signup_req("carol", "pw", "acme");
        req.profile.industry = Some("manufacturing".into());
        req.profile.manager_email = Some("carol@acme.com".into());
        signup(&store, req).await.unwrap();

        let row = store.get("carol").await.unwrap();
        assert_eq!(row.profile.industry.as_deref(), Some("manufacturing"));
        assert_eq!(row.profile.manager_email.as_deref(), Some("carol@acme.com"));
        assert_eq!(row.profile.bs_num, None);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let store = MemoryAccountStore::new();
        signup(&store, signup_req("alice", "secret123", "acme")).await.unwrap();

        let ok = login(&store, login_req("alice", "secret123")).await.unwrap();
        assert_eq!(ok.company_id, "acme");

        let wrong_pw = login(&store, login_req("alice", "wrong")).await.unwrap_err();
        let unknown = login(&store, login_req("mallory", "secret123")).await.unwrap_err();
        assert!(matches!(wrong_pw, AccountError::InvalidCredentials));
        assert!(matches!(unknown, AccountError::InvalidCredentials));
        assert_eq!(wrong_pw.to_string(), unknown.to_string());
        assert_eq!(wrong_pw.status(), unknown.status());
    }

    #[tokio::test]
    async fn storage_failures_surface_as_storage_errors() {
        let store = MemoryAccountStore::new();
        store.fail_all();
        let err = signup(&store, signup_req("alice", "pw", "acme")).await.unwrap_err();
        assert!(matches!(err, AccountError::Storage(_)));
        let err = login(&store, login_req("alice", "pw")).await.unwrap_err();
        assert!(matches!(err, AccountError::Storage(_)));
    }
}
