use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Only HMAC algorithms verify; anything else in the header is a forgery attempt
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,

    #[error("token encoding failed: {0}")]
    Encoding(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(subject: &str, secret: &str, ttl: TimeDelta) -> Result<String, AuthError> {
    issue_token_at(subject, secret, ttl, Utc::now())
}

// Sign a token as if issued at `issued_at`.
pub fn issue_token_at(
    subject: &str,
    secret: &str,
    ttl: TimeDelta,
    issued_at: DateTime<Utc>,
) -> Result<String, AuthError> {
    let claims = Claims {
        sub: subject.to_string(),
        iat: issued_at.timestamp(),
        exp: (issued_at + ttl).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Encoding(e.to_string()))
}

// Signed with `secret` and not expired. The failure reason only goes to the debug log.
pub fn verify_token(token: &str, secret: &str) -> Result<(), AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    validation.leeway = 0;
    validation.validate_aud = false;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|_| ())
        .map_err(|e| {
            tracing::debug!(reason = ?e.kind(), "token rejected");
            AuthError::InvalidToken
        })
}
