use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRef, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use tracing::warn;

use super::{
    error::AccountError,
    session::{read_cookie, SessionKeys, SESSION_COOKIE},
};

/// Reads and validates the session cookie, yielding the `user_id`.
pub struct SessionUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = AccountError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token =
            read_cookie(&parts.headers, SESSION_COOKIE).ok_or(AccountError::MissingSession)?;

        let keys = SessionKeys::from_ref(state);
        match keys.verify(&token) {
            Ok(claims) => Ok(SessionUser(claims.sub)),
            Err(e) => {
                warn!(error = %e, "rejected session cookie");
                Err(AccountError::InvalidSession)
            }
        }
    }
}

/// `Json<T>` whose rejections come back as `{"detail": ...}` instead of
/// axum's plain-text body.
pub struct AccountJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AccountJson<T>
where
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AccountError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            warn!(error = %e, "rejected request body");
            AccountError::from(e)
        })?;
        Ok(AccountJson(value))
    }
}
