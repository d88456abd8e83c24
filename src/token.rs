//! Session token issuing and verification.
//!
//! Tokens are stateless HS256 JWTs carrying the identity claims needed by
//! the authorization guards. They are invalidated only by expiry; there is
//! no revocation list.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::Role;

/// Claims embedded in every session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id (`users.id`).
    pub sub: i64,
    pub email: String,
    pub role: Role,
    /// Issued-at (Unix timestamp, seconds).
    pub iat: i64,
    /// Expiry (Unix timestamp, seconds).
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Why a token was rejected. The middleware surfaces distinct messages for
/// the two cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,
    #[error("expired token")]
    Expired,
}

/// Sign a token for the given identity, valid for `ttl_hours`.
pub fn issue(
    secret: &str,
    id: i64,
    email: &str,
    role: Role,
    ttl_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: id,
        email: email.to_string(),
        role,
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Check signature then expiry, recovering the claims.
pub fn verify(secret: &str, token: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_issue_verify_roundtrip() {
        let token = issue(SECRET, 42, "user@example.com", Role::User, 1).unwrap();
        let claims = verify(SECRET, &token).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.role, Role::User);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = issue(SECRET, 1, "a@b.c", Role::Admin, 1).unwrap();
        assert_eq!(verify("other-secret", &token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_expired_token_is_expired() {
        let token = issue(SECRET, 1, "a@b.c", Role::User, -1).unwrap();
        assert_eq!(verify(SECRET, &token), Err(TokenError::Expired));
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert_eq!(verify(SECRET, "not-a-token"), Err(TokenError::Invalid));
    }

    #[test]
    fn test_admin_claims_carry_role() {
        let token = issue(SECRET, 7, "admin@portal.local", Role::Admin, 1).unwrap();
        let claims = verify(SECRET, &token).unwrap();
        assert!(claims.is_admin());
    }
}
