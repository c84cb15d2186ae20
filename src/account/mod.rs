use crate::state::AccountState;
use axum::Router;

pub mod dto;
pub mod error;
pub(crate) mod extractors;
pub mod handlers;
#[cfg(test)]
pub(crate) mod memory;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod session;

pub fn router() -> Router<AccountState> {
    Router::new()
        .merge(handlers::health_routes())
        .merge(handlers::account_routes())
}
