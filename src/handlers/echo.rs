use axum::{
    body::Bytes,
    http::header::CONTENT_TYPE,
    response::IntoResponse,
};
use serde::de::IgnoredAny;
use crate::error::ApiError;

// Echo back any well-formed JSON body unchanged
pub async fn echo_handler(body: Bytes) -> Result<impl IntoResponse, ApiError> {
    serde_json::from_slice::<IgnoredAny>(&body).map_err(|_| ApiError::InvalidJson)?;
    Ok(([(CONTENT_TYPE, "application/json")], body))
}
