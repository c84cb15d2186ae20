use axum::{
    http::{Method, Uri},
    middleware,
    routing::{get, on, MethodFilter, MethodRouter},
    Json, Router,
};
use serde_json::{json, Value};

use crate::state::GatewayState;

pub mod cors;
pub mod error;
pub mod proxy;
pub mod routes;

use error::GatewayError;

fn proxied_methods() -> MethodFilter {
    MethodFilter::GET
        .or(MethodFilter::POST)
        .or(MethodFilter::PUT)
        .or(MethodFilter::PATCH)
        .or(MethodFilter::DELETE)
}

fn proxied<H, T>(handler: H) -> MethodRouter<GatewayState>
where
    H: axum::handler::Handler<T, GatewayState>,
    T: 'static,
{
    on(proxied_methods(), handler).fallback(method_not_allowed)
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/:service", proxied(proxy::proxy_root))
        .route("/api/:service/", proxied(proxy::proxy_root))
        .route("/api/:service/*rest", proxied(proxy::proxy_path))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), cors::apply_cors))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "gateway" }))
}

async fn not_found(uri: Uri) -> GatewayError {
    GatewayError::RouteNotFound(uri.path().to_string())
}

async fn method_not_allowed(method: Method, uri: Uri) -> GatewayError {
    GatewayError::MethodNotAllowed(format!("{method} {}", uri.path()))
}
