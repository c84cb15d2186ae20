use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures the gateway turns into `{error, detail}` JSON responses.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("unknown service: {0}")]
    UnknownService(String),

    #[error("no route for {0}")]
    RouteNotFound(String),

    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("no upstream configured for service: {0}")]
    ServiceUnavailable(String),

    #[error("failed to read request body: {0}")]
    ReadBody(String),

    #[error("{0}")]
    Upstream(#[from] reqwest::Error),

    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::UnknownService(_) | GatewayError::RouteNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            GatewayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::ReadBody(_) => StatusCode::BAD_REQUEST,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            GatewayError::UnknownService(_) | GatewayError::RouteNotFound(_) => "Not Found",
            GatewayError::MethodNotAllowed(_) => "Method Not Allowed",
            GatewayError::ServiceUnavailable(_) => "Service Unavailable",
            GatewayError::ReadBody(_) => "Bad Request",
            GatewayError::Upstream(_) => "Bad Gateway",
            GatewayError::Internal(_) => "Gateway Error",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.label(), "detail": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}
