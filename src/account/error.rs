use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use super::repo::StoreError;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),

    #[error("User ID already exists")]
    Conflict,

    #[error("Login failed: user ID or password is incorrect")]
    InvalidCredentials,

    #[error("Missing session cookie")]
    MissingSession,

    #[error("Invalid or expired session")]
    InvalidSession,

    #[error("Database connection failed")]
    DatabaseUnavailable(#[source] StoreError),

    #[error("Database error")]
    Storage(#[from] StoreError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AccountError {
    pub fn status(&self) -> StatusCode {
        match self {
            AccountError::Validation(_) => StatusCode::BAD_REQUEST,
            AccountError::Conflict => StatusCode::CONFLICT,
            AccountError::InvalidCredentials
            | AccountError::MissingSession
            | AccountError::InvalidSession => StatusCode::UNAUTHORIZED,
            AccountError::DatabaseUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AccountError::Storage(_) | AccountError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for AccountError {
    fn from(rejection: JsonRejection) -> Self {
        AccountError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        // Underlying causes are logged where they happen; clients only see
        // the display message.
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
