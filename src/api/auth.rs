//! Registration and login for regular users.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::error::{ok, ApiError, Envelope};
use crate::api::validation::{validate_email, validate_password, validate_username};
use crate::db::{self, Role, UserResponse, UserStatus};
use crate::token;
use crate::AppState;

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Envelope<UserResponse>>, ApiError> {
    validate_username(&request.username).map_err(ApiError::bad_request)?;
    validate_email(&request.email).map_err(ApiError::bad_request)?;
    validate_password(&request.password).map_err(ApiError::bad_request)?;

    if db::get_user_by_email(&state.db, &request.email)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("email is already registered"));
    }

    let hash = hash_password(&request.password)
        .map_err(|e| ApiError::internal(format!("failed to hash password: {e}")))?;
    // The unique index still backstops a concurrent duplicate; the sqlx
    // conversion maps that to a 409 as well.
    let user = db::create_user(&state.db, &request.username, &request.email, &hash, Role::User)
        .await?;

    tracing::info!("Registered user {}", user.email);
    Ok(ok(UserResponse::from(user)))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Envelope<LoginResponse>>, ApiError> {
    let user = db::get_user_by_email(&state.db, &request.email).await?;

    // Same rejection whether the account is missing or the password is
    // wrong, so the endpoint does not leak which emails exist.
    let user = match user {
        Some(u) if verify_password(&request.password, &u.password_hash) => u,
        _ => return Err(ApiError::unauthorized("invalid email or password")),
    };

    if user.status == UserStatus::Disabled {
        return Err(ApiError::forbidden("account is disabled"));
    }

    let token = token::issue(
        state.config.jwt_secret(),
        user.id,
        &user.email,
        user.role,
        state.config.auth.token_ttl_hours,
    )
    .map_err(|e| ApiError::internal(format!("failed to issue token: {e}")))?;

    Ok(ok(LoginResponse {
        token,
        user: UserResponse::from(user),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("hunter22", "not-a-phc-string"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }
}
