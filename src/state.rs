use chrono::TimeDelta;
use crate::books::BookService;
// app's shared state, handed to the handlers

pub struct AppState {
    pub books: BookService,
    pub token_issuer: TokenIssuer,
}

// What POST /auth/token needs to mint a token
pub struct TokenIssuer {
    pub secret: String,
    pub ttl: TimeDelta, // how long an issued token stays valid
    pub username: String,
    pub password: String,
}
