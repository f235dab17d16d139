mod auth;
mod rate_limit;
mod request_log;
mod timeout;

pub use auth::{BearerAuth, require_bearer};
pub use rate_limit::{
    KeyExtractor, PeerIp, RateLimitState, RealIp, UNKNOWN_CLIENT, X_RATELIMIT_LIMIT,
    X_RATELIMIT_REMAINING, rate_limit,
};
pub use request_log::{X_REQUEST_ID, log_requests};
pub use timeout::{MAX_BODY_BYTES, Timeouts, enforce_timeouts};
