//! Endpoints for the signed-in user: profile, password, favorites.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::auth::{hash_password, verify_password};
use crate::api::error::{ok, ok_message, ApiError, Envelope};
use crate::api::extract::AuthUser;
use crate::api::validation::{validate_password, validate_username};
use crate::db::{self, ArticleListResponse, UserResponse};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateInfoRequest {
    pub username: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

async fn current_user(state: &AppState, id: i64) -> Result<db::User, ApiError> {
    db::get_user_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("account no longer exists"))
}

/// GET /api/user/info
///
/// Always reads the row rather than echoing token claims, so profile
/// edits show up without re-login.
pub async fn info(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Envelope<UserResponse>>, ApiError> {
    let user = current_user(&state, user.0.sub).await?;
    Ok(ok(UserResponse::from(user)))
}

/// PUT /api/user/info
pub async fn update_info(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<UpdateInfoRequest>,
) -> Result<Json<Envelope<UserResponse>>, ApiError> {
    if let Some(username) = &request.username {
        validate_username(username).map_err(ApiError::bad_request)?;
    }

    let updated = db::update_user_info(
        &state.db,
        user.0.sub,
        request.username.as_deref(),
        request.avatar.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::unauthorized("account no longer exists"))?;
    Ok(ok(UserResponse::from(updated)))
}

/// PUT /api/user/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<Envelope<()>>, ApiError> {
    validate_password(&request.new_password).map_err(ApiError::bad_request)?;

    let current = current_user(&state, user.0.sub).await?;
    if !verify_password(&request.old_password, &current.password_hash) {
        return Err(ApiError::bad_request("old password is incorrect"));
    }

    let hash = hash_password(&request.new_password)
        .map_err(|e| ApiError::internal(format!("failed to hash password: {e}")))?;
    db::update_password(&state.db, current.id, &hash).await?;
    Ok(ok_message("password updated"))
}

/// GET /api/user/favorites
pub async fn favorites(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Envelope<ArticleListResponse>>, ApiError> {
    let result = db::list_favorites(
        &state.db,
        user.0.sub,
        page.page.unwrap_or(1),
        page.page_size.unwrap_or(20),
    )
    .await?;
    Ok(ok(result))
}

/// POST /api/user/favorites/:articleId
///
/// Favoriting the same article twice is a no-op, not an error.
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(article_id): Path<i64>,
) -> Result<Json<Envelope<()>>, ApiError> {
    if db::get_article(&state.db, article_id).await?.is_none() {
        return Err(ApiError::not_found("article not found"));
    }
    db::add_favorite(&state.db, user.0.sub, article_id).await?;
    Ok(ok_message("favorited"))
}

/// DELETE /api/user/favorites/:articleId
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(article_id): Path<i64>,
) -> Result<Json<Envelope<()>>, ApiError> {
    db::remove_favorite(&state.db, user.0.sub, article_id).await?;
    Ok(ok_message("unfavorited"))
}
