//! Request extractors for the authenticated identity.
//!
//! `AuthUser` rejects with 401 when the token is missing, invalid, or
//! expired. `MaybeUser` never rejects and is used by endpoints whose
//! behavior merely changes for signed-in callers. `AdminUser` and
//! `SuperAdmin` layer role checks on top of `AuthUser`.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::token::{self, Claims};
use crate::AppState;

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn verify_from_parts(parts: &Parts, state: &Arc<AppState>) -> Result<Claims, ApiError> {
    let token = bearer_token(parts).ok_or_else(|| ApiError::unauthorized("missing token"))?;
    token::verify(state.config.jwt_secret(), token)
        .map_err(|e| ApiError::unauthorized(e.to_string()))
}

/// Identity of the authenticated caller. Required.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        verify_from_parts(parts, state).map(AuthUser)
    }
}

/// Identity of the caller when one is present. A missing or bad token
/// yields `MaybeUser(None)` rather than a rejection.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Claims>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(verify_from_parts(parts, state).ok()))
    }
}

impl MaybeUser {
    pub fn is_admin(&self) -> bool {
        self.0.as_ref().is_some_and(Claims::is_admin)
    }
}

/// Authenticated caller with the admin role. Rejects with 403 otherwise.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = verify_from_parts(parts, state)?;
        if !claims.is_admin() {
            return Err(ApiError::forbidden("admin required"));
        }
        Ok(AdminUser(claims))
    }
}

/// The super admin: the account whose id matches the configured
/// `super_admin_id`. Only this account manages other admins.
#[derive(Debug, Clone)]
pub struct SuperAdmin(pub Claims);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for SuperAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = verify_from_parts(parts, state)?;
        if !claims.is_admin() || claims.sub != state.config.auth.super_admin_id {
            return Err(ApiError::forbidden("super admin required"));
        }
        Ok(SuperAdmin(claims))
    }
}

/// Whether `caller` may delete the admin account `target`. The super admin
/// account itself and the caller's own account are never deletable.
pub fn validate_admin_deletion(
    caller: &Claims,
    target_id: i64,
    super_admin_id: i64,
) -> Result<(), ApiError> {
    if target_id == super_admin_id {
        return Err(ApiError::forbidden("the super admin account cannot be deleted"));
    }
    if target_id == caller.sub {
        return Err(ApiError::forbidden("you cannot delete your own account"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::Role;
    use crate::token;
    use axum::http::{Request, StatusCode};

    fn claims(id: i64, role: Role) -> Claims {
        Claims {
            sub: id,
            email: format!("u{id}@example.com"),
            role,
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[test]
    fn test_super_admin_cannot_be_deleted() {
        let caller = claims(5, Role::Admin);
        let err = validate_admin_deletion(&caller, 1, 1).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_self_deletion_is_refused() {
        let caller = claims(1, Role::Admin);
        let err = validate_admin_deletion(&caller, 1, 1).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let caller = claims(7, Role::Admin);
        assert!(validate_admin_deletion(&caller, 7, 1).is_err());
    }

    #[test]
    fn test_other_admins_are_deletable() {
        let caller = claims(1, Role::Admin);
        assert!(validate_admin_deletion(&caller, 9, 1).is_ok());
    }

    async fn test_state(secret: &str) -> Arc<AppState> {
        let mut config = Config::default();
        config.auth.jwt_secret = Some(secret.to_string());
        Arc::new(AppState::new(config, crate::db::test_pool().await))
    }

    fn bearer_parts(token: &str) -> axum::http::request::Parts {
        Request::builder()
            .header("Authorization", format!("Bearer {token}"))
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn test_any_admin_passes_admin_guard_but_not_super() {
        let state = test_state("guard-secret").await;
        let token = token::issue("guard-secret", 5, "five@example.com", Role::Admin, 1).unwrap();

        let mut parts = bearer_parts(&token);
        let admin = AdminUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(admin.0.sub, 5);

        let mut parts = bearer_parts(&token);
        let err = SuperAdmin::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_regular_user_is_rejected_by_admin_guard() {
        let state = test_state("guard-secret").await;
        let token = token::issue("guard-secret", 9, "nine@example.com", Role::User, 1).unwrap();

        let mut parts = bearer_parts(&token);
        let err = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let state = test_state("guard-secret").await;
        let mut parts = Request::builder().body(()).unwrap().into_parts().0;

        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.message(), "missing token");

        let MaybeUser(identity) = MaybeUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(identity.is_none());
    }
}
