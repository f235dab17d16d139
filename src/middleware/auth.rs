use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::auth::verify_token;
use crate::error::ApiError;
use crate::metrics::UNAUTHORIZED_TOTAL;

#[derive(Clone)]
pub struct BearerAuth {
    secret: Arc<str>,
}

impl BearerAuth {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn authorize(&self, headers: &HeaderMap) -> bool {
        bearer_token(headers).is_some_and(|token| verify_token(token, &self.secret).is_ok())
    }
}

// Token part of `Authorization: Bearer <token>`, scheme matched case-insensitively
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty()).then_some(token)
}

// Every failure gets the same 401 body
pub async fn require_bearer(
    State(auth): State<BearerAuth>,
    request: Request,
    next: Next,
) -> Response {
    if !auth.authorize(request.headers()) {
        UNAUTHORIZED_TOTAL.inc();
        return ApiError::Unauthorized.into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::issue_token;
    use axum::{
        Router,
        body::Body,
        http::{HeaderValue, StatusCode},
        middleware,
        routing::get,
    };
    use chrono::TimeDelta;
    use tower::ServiceExt;

    const SECRET: &str = "test-secret";

    fn app() -> Router {
        Router::new()
            .route("/books", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(BearerAuth::new(SECRET), require_bearer))
    }

    async fn call(authorization: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().uri("/books");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn valid_token_passes() {
        let token = issue_token("admin", SECRET, TimeDelta::hours(1)).unwrap();
        let (status, body) = call(Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn scheme_is_case_insensitive() {
        let token = issue_token("admin", SECRET, TimeDelta::hours(1)).unwrap();
        let (status, _) = call(Some(&format!("  bEaReR   {token}  "))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn every_failure_looks_the_same() {
        let token = issue_token("admin", SECRET, TimeDelta::hours(1)).unwrap();
        let foreign = issue_token("admin", "other", TimeDelta::hours(1)).unwrap();
        let basic = format!("Basic {token}");
        let wrong_secret = format!("Bearer {foreign}");

        let (_, reference) = call(None).await;
        let cases = [
            None,
            Some(""),
            Some("Bearer"),
            Some("Bearer    "),
            Some("Bearer badtoken"),
            Some(basic.as_str()),
            Some(token.as_str()),
            Some(wrong_secret.as_str()),
        ];

        for case in cases {
            let (status, body) = call(case).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "case {case:?}");
            assert_eq!(body, reference, "case {case:?}");
        }

        let json: serde_json::Value = serde_json::from_slice(&reference).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"error_code": "UNAUTHORIZED", "message": "unauthorized"})
        );
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Token abc"));
        assert_eq!(bearer_token(&headers), None);
    }
}
