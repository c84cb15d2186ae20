use axum::{
    extract::{FromRef, State},
    http::{header, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    account::{
        dto::{
            AccountResponse, DbHealthResponse, HealthResponse, LoginRequest, LogoutResponse,
            ProfileResponse, RootResponse, SignupRequest,
        },
        error::AccountError,
        extractors::{AccountJson, SessionUser},
        services,
        session::SessionKeys,
    },
    state::AccountState,
};

const SERVICE: &str = "account-service";

pub fn health_routes() -> Router<AccountState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/health/db", get(db_health))
}

pub fn account_routes() -> Router<AccountState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/profile", get(profile))
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok",
        service: SERVICE,
        endpoints: &["/health", "/health/db", "/signup", "/login", "/logout", "/profile"],
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE,
    })
}

#[instrument(skip(state))]
pub async fn db_health(
    State(state): State<AccountState>,
) -> Result<Json<DbHealthResponse>, AccountError> {
    match state.store.count().await {
        Ok(count) => {
            info!(auth_table_count = count, "database health check ok");
            Ok(Json(DbHealthResponse {
                status: "healthy",
                database: "connected",
                auth_table_count: count,
                message: "Database connection successful",
            }))
        }
        Err(e) => {
            error!(error = %e, "database health check failed");
            Err(AccountError::DatabaseUnavailable(e))
        }
    }
}

#[instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn signup(
    State(state): State<AccountState>,
    AccountJson(payload): AccountJson<SignupRequest>,
) -> Result<Json<AccountResponse>, AccountError> {
    let account = services::signup(state.store.as_ref(), payload).await?;
    Ok(Json(AccountResponse::success("Signup succeeded", &account)))
}

#[instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn login(
    State(state): State<AccountState>,
    AccountJson(payload): AccountJson<LoginRequest>,
) -> Result<(HeaderMap, Json<AccountResponse>), AccountError> {
    let account = services::login(state.store.as_ref(), payload).await?;

    let keys = SessionKeys::from_ref(&state);
    let cookie = keys
        .sign(&account.user_id)
        .and_then(|token| keys.set_cookie(&token))
        .map_err(|e| {
            error!(error = %e, "session sign failed");
            AccountError::Internal(e)
        })?;

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, cookie);
    Ok((headers, Json(AccountResponse::success("Login succeeded", &account))))
}

pub async fn logout(State(state): State<AccountState>) -> (HeaderMap, Json<LogoutResponse>) {
    let keys = SessionKeys::from_ref(&state);
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, keys.clear_cookie());
    info!("logout");
    (
        headers,
        Json(LogoutResponse {
            success: true,
            message: "Logged out".into(),
        }),
    )
}

#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AccountState>,
    SessionUser(user_id): SessionUser,
) -> Result<Json<ProfileResponse>, AccountError> {
    let account = state
        .store
        .find_by_user_id(&user_id)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "profile lookup failed");
            AccountError::Storage(e)
        })?
        .ok_or_else(|| {
            warn!(%user_id, "session refers to missing account");
            AccountError::InvalidSession
        })?;

    Ok(Json(ProfileResponse::from(account)))
}
