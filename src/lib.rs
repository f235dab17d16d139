pub mod auth;
pub mod books;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod repository;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

use crate::handlers::{
    create_book, delete_book, echo_handler, get_book, list_books, metrics_handler, ping_handler,
    token_handler, update_book,
};
use crate::error::panic_response;
use crate::middleware::{
    BearerAuth, RateLimitState, Timeouts, enforce_timeouts, log_requests, rate_limit,
    require_bearer,
};
use crate::state::AppState;

// Build the full router.
pub fn router(
    state: Arc<AppState>,
    limits: RateLimitState,
    bearer: BearerAuth,
    timeouts: Timeouts,
) -> Router {
    with_middleware(routes(state, bearer), limits, timeouts)
}

// Bearer auth only guards `GET /books`.
pub fn routes(state: Arc<AppState>, bearer: BearerAuth) -> Router {
    let require_auth = axum::middleware::from_fn_with_state(bearer, require_bearer);

    Router::new()
        .route("/ping", get(ping_handler))
        .route("/echo", post(echo_handler))
        .route("/auth/token", post(token_handler))
        // route_layer only wraps methods registered before it
        .route(
            "/books",
            get(list_books).route_layer(require_auth).post(create_book),
        )
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

// Outermost first: request log, panic recovery, rate limit, timeouts.
pub fn with_middleware(routes: Router, limits: RateLimitState, timeouts: Timeouts) -> Router {
    routes
        .layer(axum::middleware::from_fn_with_state(timeouts, enforce_timeouts))
        .layer(axum::middleware::from_fn_with_state(limits, rate_limit))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(axum::middleware::from_fn(log_requests))
}
