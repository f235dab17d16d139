use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use std::sync::Arc;
use crate::error::ApiError;
use crate::handlers::decode_json;
use crate::models::{Book, BookListQuery, CreateBookRequest};
use crate::state::AppState;

pub async fn create_book(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let req: CreateBookRequest = decode_json(&body)?;
    let book = state.books.create(req)?;
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn list_books(
    State(state): State<Arc<AppState>>,
    query: Result<Query<BookListQuery>, QueryRejection>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let Query(query) = query.map_err(|err| ApiError::InvalidQuery(err.body_text()))?;
    Ok(Json(state.books.list(query)?))
}

pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    Ok(Json(state.books.get(&id)?))
}

pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Book>, ApiError> {
    let req: CreateBookRequest = decode_json(&body)?;
    Ok(Json(state.books.update(&id, req)?))
}

pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.books.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
