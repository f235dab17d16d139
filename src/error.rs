use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use thiserror::Error;

use crate::books::BookError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("rate limit exceeded")]
    RateLimited,

    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid JSON body")]
    InvalidJson,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid book id")]
    InvalidBookId,

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("book not found")]
    BookNotFound,

    #[error("request timed out")]
    Timeout,

    #[error("internal server error")]
    Internal(String),
}

// Body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::InvalidJson
            | ApiError::Validation(_)
            | ApiError::InvalidBookId
            | ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::BookNotFound => StatusCode::NOT_FOUND,
            ApiError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::RateLimited => "RATE_LIMIT_EXCEEDED",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::InvalidJson => "INVALID_JSON_BODY",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::InvalidBookId => "INVALID_BOOK_ID",
            ApiError::InvalidQuery(_) => "INVALID_QUERY",
            ApiError::BookNotFound => "BOOK_NOT_FOUND",
            ApiError::Timeout => "REQUEST_TIMEOUT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // internal details stay in the log
        if let ApiError::Internal(detail) = &self {
            tracing::error!(error = %detail, "request failed");
        }

        let body = ErrorResponse {
            error_code: self.error_code().to_string(),
            message: self.to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}

// Handed to CatchPanicLayer so a panicking handler still gets the JSON 500
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::Internal(format!("handler panicked: {detail}")).into_response()
}

impl From<BookError> for ApiError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::Validation(detail) => ApiError::Validation(detail),
            BookError::InvalidId => ApiError::InvalidBookId,
            BookError::InvalidQuery(detail) => ApiError::InvalidQuery(detail),
            BookError::NotFound => ApiError::BookNotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: ApiError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn rate_limited_body() {
        let (status, body) = body_of(ApiError::RateLimited).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body.error_code, "RATE_LIMIT_EXCEEDED");
        assert_eq!(body.message, "rate limit exceeded");
    }

    #[tokio::test]
    async fn unauthorized_body() {
        let (status, body) = body_of(ApiError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error_code, "UNAUTHORIZED");
        assert_eq!(body.message, "unauthorized");
    }

    #[tokio::test]
    async fn internal_detail_is_not_leaked() {
        let (status, body) = body_of(ApiError::Internal("disk on fire".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "internal server error");
    }

    #[tokio::test]
    async fn timeout_body() {
        let (status, body) = body_of(ApiError::Timeout).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.error_code, "REQUEST_TIMEOUT");
    }

    #[tokio::test]
    async fn panic_payload_becomes_internal_error() {
        for payload in [Box::new("boom") as Box<dyn Any + Send>, Box::new(String::from("boom")), Box::new(7_u8)] {
            let response = panic_response(payload);
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body.error_code, "INTERNAL_ERROR");
            assert_eq!(body.message, "internal server error");
        }
    }

    #[test]
    fn book_errors_map_to_codes() {
        let err: ApiError = BookError::Validation("title is required".into()).into();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.to_string(), "validation error: title is required");

        let err: ApiError = BookError::InvalidId.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = BookError::NotFound.into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: ApiError = BookError::InvalidQuery("page must be a positive integer".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_QUERY");
        assert_eq!(err.to_string(), "invalid query: page must be a positive integer");
    }
}
