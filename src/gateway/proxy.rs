//! Forwards `/api/{service}/{rest}` to the configured upstream and relays
//! the answer. One attempt per request; no retries.

use axum::{
    body::{to_bytes, Body},
    extract::{Path, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    response::Response,
};
use bytes::Bytes;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::{error::GatewayError, routes::upstream_url};
use crate::state::GatewayState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Never forwarded upstream.
const HOP_BY_HOP: &[&str] = &[
    "host",
    "content-length",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// The only upstream headers relayed to the caller.
const RELAYED: &[&str] = &["content-type", "set-cookie", "cache-control"];

pub async fn proxy_root(
    State(state): State<GatewayState>,
    Path(service): Path<String>,
    req: Request,
) -> Result<Response, GatewayError> {
    forward(&state, &service, "", req).await
}

pub async fn proxy_path(
    State(state): State<GatewayState>,
    Path((service, rest)): Path<(String, String)>,
    req: Request,
) -> Result<Response, GatewayError> {
    forward(&state, &service, &rest, req).await
}

#[instrument(skip(state, req), fields(method = %req.method(), request_id))]
pub async fn forward(
    state: &GatewayState,
    service: &str,
    rest: &str,
    req: Request,
) -> Result<Response, GatewayError> {
    let base = state.routes.resolve(service)?;
    let mut url = upstream_url(base, rest);
    if let Some(query) = req.uri().query() {
        url.push('?');
        url.push_str(query);
    }

    let (parts, body) = req.into_parts();
    let mut headers = outbound_headers(&parts.headers);
    let request_id = ensure_request_id(&mut headers);
    tracing::Span::current().record("request_id", tracing::field::display(&request_id));

    let body: Bytes = to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|e| GatewayError::ReadBody(e.to_string()))?;

    info!(%url, "forwarding");
    let upstream = state
        .client
        .request(parts.method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            error!(error = %e, %url, timeout = e.is_timeout(), "upstream request failed");
            GatewayError::Upstream(e)
        })?;

    let status = upstream.status();
    let relayed = relayed_headers(upstream.headers());
    let bytes = upstream.bytes().await.map_err(|e| {
        error!(error = %e, %url, "reading upstream body failed");
        GatewayError::Upstream(e)
    })?;
    info!(%status, %url, "relayed");

    let mut res = Response::builder().status(status);
    if let Some(h) = res.headers_mut() {
        *h = relayed;
    }
    res.body(Body::from(bytes)).map_err(|e| {
        error!(error = %e, "building relayed response failed");
        GatewayError::Internal(e.to_string())
    })
}

fn outbound_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut out = inbound.clone();
    for name in HOP_BY_HOP {
        out.remove(*name);
    }
    out
}

fn ensure_request_id(headers: &mut HeaderMap) -> String {
    if let Some(existing) = headers.get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()) {
        return existing.to_string();
    }
    let id = Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&id) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    id
}

fn relayed_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for name in RELAYED {
        for value in upstream.get_all(*name) {
            out.append(HeaderName::from_static(name), value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use axum::http::header;

    use super::*;

    #[test]
    fn strips_host_and_hop_by_hop() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::HOST, HeaderValue::from_static("gateway.local"));
        inbound.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        inbound.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        inbound.insert(header::CONTENT_LENGTH, HeaderValue::from_static("12"));
        inbound.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        inbound.insert(header::COOKIE, HeaderValue::from_static("session_token=x"));

        let out = outbound_headers(&inbound);
        assert!(out.get(header::HOST).is_none());
        assert!(out.get(header::CONNECTION).is_none());
        assert!(out.get("keep-alive").is_none());
        assert!(out.get(header::CONTENT_LENGTH).is_none());
        assert_eq!(out[header::AUTHORIZATION], "Bearer t");
        assert_eq!(out[header::COOKIE], "session_token=x");
    }

    #[test]
    fn request_id_is_kept_or_generated() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc-123"));
        assert_eq!(ensure_request_id(&mut headers), "abc-123");

        let mut headers = HeaderMap::new();
        let id = ensure_request_id(&mut headers);
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(headers[REQUEST_ID_HEADER], id.as_str());
    }

    #[test]
    fn relays_only_whitelisted_headers() {
        let mut upstream = HeaderMap::new();
        upstream.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        upstream.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        upstream.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));
        upstream.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        upstream.insert("x-internal-node", HeaderValue::from_static("pod-7"));
        upstream.insert(header::SERVER, HeaderValue::from_static("uvicorn"));

        let out = relayed_headers(&upstream);
        assert_eq!(out.len(), 4);
        assert_eq!(out.get_all(header::SET_COOKIE).iter().count(), 2);
        assert!(out.get("x-internal-node").is_none());
        assert!(out.get(header::SERVER).is_none());
    }
}
