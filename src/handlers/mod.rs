mod books;
mod echo;
mod metrics;
mod ping;
mod token;

pub use books::{create_book, delete_book, get_book, list_books, update_book};
pub use echo::echo_handler;
pub use metrics::metrics_handler;
pub use ping::ping_handler;
pub use token::token_handler;

use axum::body::Bytes;
use serde::de::DeserializeOwned;
use crate::error::ApiError;

// Strict JSON decoding: unknown fields and trailing content are rejected
pub(crate) fn decode_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)
}
