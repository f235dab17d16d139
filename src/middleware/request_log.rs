use axum::{
    body::HttpBody,
    extract::{ConnectInfo, Request},
    http::{HeaderName, HeaderValue, header::USER_AGENT},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::time::Instant;
use uuid::Uuid;

use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

// Reuse the caller's request id when it sent a usable one
fn request_id(request: &Request) -> String {
    request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

// Size of the response body, when the body knows it
fn response_bytes(response: &Response) -> u64 {
    let hint = response.body().size_hint();
    hint.exact().unwrap_or_else(|| hint.lower())
}

// One structured log line per request
pub async fn log_requests(request: Request, next: Next) -> Response {
    REQUEST_TOTAL.inc();
    let started_at = Instant::now();

    let request_id = request_id(&request);
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let remote_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default();
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut response = next.run(request).await;

    let elapsed = started_at.elapsed();
    REQUEST_LATENCY.observe(elapsed.as_secs_f64());

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        bytes = response_bytes(&response),
        duration_ms = elapsed.as_millis() as u64,
        remote_ip = %remote_ip,
        user_agent = %user_agent,
        "http request"
    );

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}
