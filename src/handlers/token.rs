use axum::{Json, body::Bytes, extract::State};
use std::sync::Arc;
use crate::auth::issue_token;
use crate::error::ApiError;
use crate::handlers::decode_json;
use crate::models::{TokenRequest, TokenResponse};
use crate::state::AppState;

pub async fn token_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TokenResponse>, ApiError> {
    let req: TokenRequest = decode_json(&body)?;
    let issuer = &state.token_issuer;

    if req.username != issuer.username || req.password != issuer.password {
        return Err(ApiError::InvalidCredentials);
    }

    let token = issue_token(&req.username, &issuer.secret, issuer.ttl)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(TokenResponse { token }))
}
