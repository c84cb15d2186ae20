use std::collections::HashSet;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::state::GatewayState;

const ALLOW_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";

/// Origin whitelist. Non-whitelisted origins get no CORS headers at all,
/// leaving the browser to block the response.
#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    whitelist: HashSet<String>,
}

impl CorsPolicy {
    pub fn new(origins: impl IntoIterator<Item = String>) -> Self {
        Self {
            whitelist: origins.into_iter().collect(),
        }
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.whitelist.contains(origin)
    }

    pub fn headers_for(&self, request: &HeaderMap) -> HeaderMap {
        let mut out = HeaderMap::new();
        let Some(origin) = request.get(header::ORIGIN) else {
            return out;
        };
        if !origin.to_str().map(|o| self.allows(o)).unwrap_or(false) {
            return out;
        }

        let allow_headers = request
            .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("*"));

        out.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        out.insert(header::VARY, HeaderValue::from_static("Origin"));
        out.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        out.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        out.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, allow_headers);
        out
    }
}

/// Answers preflights directly and stamps CORS headers on every other
/// response, errors included.
pub async fn apply_cors(State(state): State<GatewayState>, req: Request, next: Next) -> Response {
    let cors = state.cors.headers_for(req.headers());

    if req.method() == Method::OPTIONS {
        return (StatusCode::NO_CONTENT, cors).into_response();
    }

    let mut res = next.run(req).await;
    for (name, value) in cors.iter() {
        res.headers_mut().insert(name, value.clone());
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> CorsPolicy {
        CorsPolicy::new(["https://eripotter.com".to_string()])
    }

    #[test]
    fn whitelisted_origin_is_echoed() {
        let mut req = HeaderMap::new();
        req.insert(header::ORIGIN, HeaderValue::from_static("https://eripotter.com"));
        req.insert(
            header::ACCESS_CONTROL_REQUEST_HEADERS,
            HeaderValue::from_static("content-type, authorization"),
        );

        let out = policy().headers_for(&req);
        assert_eq!(out[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://eripotter.com");
        assert_eq!(out[header::VARY], "Origin");
        assert_eq!(out[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(out[header::ACCESS_CONTROL_ALLOW_HEADERS], "content-type, authorization");
    }

    #[test]
    fn allow_headers_defaults_to_wildcard() {
        let mut req = HeaderMap::new();
        req.insert(header::ORIGIN, HeaderValue::from_static("https://eripotter.com"));
        assert_eq!(policy().headers_for(&req)[header::ACCESS_CONTROL_ALLOW_HEADERS], "*");
    }

    #[test]
    fn other_origins_get_nothing() {
        let mut req = HeaderMap::new();
        req.insert(header::ORIGIN, HeaderValue::from_static("https://evil.example"));
        assert!(policy().headers_for(&req).is_empty());
        assert!(policy().headers_for(&HeaderMap::new()).is_empty());
    }
}
