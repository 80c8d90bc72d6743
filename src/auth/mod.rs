//! Authentication module for the Chirpy server
//!
//! Password hashing, signed session tokens and the login/refresh/revoke
//! endpoints.

pub mod handlers;
mod password;
mod tokens;

pub use password::{hash_password, verify_password};
pub use tokens::{strip_bearer, Claims, TokenKind, TokenService};

use crate::error::AuthError;
use actix_web::{http::header, HttpRequest};

/// Raw `Authorization` header value, still carrying its `Bearer ` prefix.
pub fn authorization_header(req: &HttpRequest) -> Result<String, AuthError> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned)
        .ok_or(AuthError::MissingToken)
}
