use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::error::ApiError;
use crate::metrics::{RATE_LIMITED_TOTAL, RATE_LIMIT_KEYS};
use crate::rate_limit::RateLimiter;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

// Key for requests whose client can't be identified
pub const UNKNOWN_CLIENT: &str = "unknown";

pub trait KeyExtractor: Send + Sync {
    fn extract(&self, request: &Request) -> String;
}

// TCP peer address
#[derive(Debug, Default, Clone, Copy)]
pub struct PeerIp;

impl KeyExtractor for PeerIp {
    fn extract(&self, request: &Request) -> String {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
    }
}

// X-Real-IP, then first X-Forwarded-For hop, then peer. Only behind a trusted proxy.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealIp;

impl KeyExtractor for RealIp {
    fn extract(&self, request: &Request) -> String {
        forwarded_ip(request.headers()).unwrap_or_else(|| PeerIp.extract(request))
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(real_ip) = header("x-real-ip") {
        return Some(real_ip.to_string());
    }

    header("x-forwarded-for")
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

#[derive(Clone)]
pub struct RateLimitState {
    limiter: Arc<RateLimiter>,
    extractor: Arc<dyn KeyExtractor>,
}

impl RateLimitState {
    pub fn new(limiter: Arc<RateLimiter>, extractor: Arc<dyn KeyExtractor>) -> Self {
        Self { limiter, extractor }
    }
}

pub async fn rate_limit(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    let key = state.extractor.extract(&request);
    let admission = state.limiter.check(&key);
    RATE_LIMIT_KEYS.set(admission.tracked as f64);

    let mut response = if admission.allowed {
        next.run(request).await
    } else {
        RATE_LIMITED_TOTAL.inc();
        tracing::debug!(client = %key, retry_after = admission.retry_after, "rate limited");

        let mut denied = ApiError::RateLimited.into_response();
        if admission.retry_after > 0 {
            denied
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(admission.retry_after));
        }
        denied
    };

    let headers = response.headers_mut();
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(state.limiter.limit()));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(admission.remaining));
    response
}
