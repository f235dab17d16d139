use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Duration;
use tokio::time::timeout;

use crate::error::ApiError;

// Bodies past this are refused before any handler sees them
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    // Reading the request body
    pub read: Duration,
    // Producing the response once the body is in
    pub write: Duration,
}

impl Timeouts {
    pub fn from_secs(read: u64, write: u64) -> Self {
        Self {
            read: Duration::from_secs(read),
            write: Duration::from_secs(write),
        }
    }
}

pub async fn enforce_timeouts(
    State(timeouts): State<Timeouts>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    let body = match timeout(timeouts.read, to_bytes(body, MAX_BODY_BYTES)).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "request body rejected");
            return ApiError::InvalidJson.into_response();
        }
        Err(_) => {
            tracing::warn!(path = %parts.uri.path(), "request body read timed out");
            return ApiError::Timeout.into_response();
        }
    };

    let path = parts.uri.path().to_string();
    let request = Request::from_parts(parts, Body::from(body));
    match timeout(timeouts.write, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(path = %path, "handler timed out");
            ApiError::Timeout.into_response()
        }
    }
}
