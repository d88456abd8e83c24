//! Admin endpoints: admin sessions, admin account management, and the
//! management surfaces for articles, categories, and comments.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::auth::{hash_password, verify_password, LoginRequest, LoginResponse};
use crate::api::error::{ok, ok_message, ApiError, Envelope};
use crate::api::extract::{validate_admin_deletion, AdminUser, SuperAdmin};
use crate::api::validation::{
    validate_email, validate_password, validate_slug, validate_title, validate_username,
};
use crate::db::{
    self, Article, ArticleListResponse, ArticleQuery, Category, Comment, CommentListResponse,
    CommentQuery, CommentStatus, CreateArticle, CreateCategory, Role, UpdateArticle,
    UpdateCategory, UserResponse, UserStatus,
};
use crate::token;
use crate::AppState;

// ---------------------------------------------------------------------------
// Sessions and admin accounts
// ---------------------------------------------------------------------------

/// POST /api/admin/login
///
/// Same credential check as the user login but restricted to admin
/// accounts, and the issued token expires sooner.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Envelope<LoginResponse>>, ApiError> {
    let user = db::get_user_by_email(&state.db, &request.email).await?;

    let user = match user {
        Some(u) if verify_password(&request.password, &u.password_hash) => u,
        _ => return Err(ApiError::unauthorized("invalid email or password")),
    };

    if user.role != Role::Admin {
        return Err(ApiError::forbidden("admin required"));
    }
    if user.status == UserStatus::Disabled {
        return Err(ApiError::forbidden("account is disabled"));
    }

    let token = token::issue(
        state.config.jwt_secret(),
        user.id,
        &user.email,
        user.role,
        state.config.auth.admin_token_ttl_hours,
    )
    .map_err(|e| ApiError::internal(format!("failed to issue token: {e}")))?;

    Ok(ok(LoginResponse {
        token,
        user: UserResponse::from(user),
    }))
}

/// GET /api/admin/info
pub async fn info(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
) -> Result<Json<Envelope<UserResponse>>, ApiError> {
    let user = db::get_user_by_id(&state.db, admin.0.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("account no longer exists"))?;
    Ok(ok(UserResponse::from(user)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// PUT /api/admin/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<Envelope<()>>, ApiError> {
    validate_password(&request.new_password).map_err(ApiError::bad_request)?;

    let current = db::get_user_by_id(&state.db, admin.0.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("account no longer exists"))?;
    if !verify_password(&request.old_password, &current.password_hash) {
        return Err(ApiError::bad_request("old password is incorrect"));
    }

    let hash = hash_password(&request.new_password)
        .map_err(|e| ApiError::internal(format!("failed to hash password: {e}")))?;
    db::update_password(&state.db, current.id, &hash).await?;
    Ok(ok_message("password updated"))
}

/// GET /api/admin/admins
///
/// Any admin may see the roster; only the super admin mutates it.
pub async fn list_admins(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Envelope<Vec<UserResponse>>>, ApiError> {
    let admins = db::list_admins(&state.db).await?;
    Ok(ok(admins.into_iter().map(UserResponse::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// POST /api/admin/admins
pub async fn create_admin(
    State(state): State<Arc<AppState>>,
    _super_admin: SuperAdmin,
    Json(request): Json<CreateAdminRequest>,
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
    let admin = db::create_user(
        &state.db,
        &request.username,
        &request.email,
        &hash,
        Role::Admin,
    )
    .await?;

    tracing::info!("Created admin account {}", admin.email);
    Ok(ok(UserResponse::from(admin)))
}

/// DELETE /api/admin/admins/:id
///
/// Neither the super admin account nor the caller's own account can be
/// removed.
pub async fn delete_admin(
    State(state): State<Arc<AppState>>,
    super_admin: SuperAdmin,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<()>>, ApiError> {
    validate_admin_deletion(&super_admin.0, id, state.config.auth.super_admin_id)?;

    let target = db::get_user_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("admin not found"))?;
    if target.role != Role::Admin {
        return Err(ApiError::not_found("admin not found"));
    }

    let authored = db::count_authored_articles(&state.db, id).await?;
    if authored > 0 {
        return Err(ApiError::conflict(format!(
            "admin still has {authored} authored articles"
        )));
    }

    db::delete_user(&state.db, id).await?;
    tracing::info!("Deleted admin account {}", target.email);
    Ok(ok_message("admin deleted"))
}

// ---------------------------------------------------------------------------
// Article management
// ---------------------------------------------------------------------------

/// GET /api/admin/articles
///
/// Unlike the public listing, the status filter passes through untouched,
/// so drafts and archived articles are reachable.
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<ArticleQuery>,
) -> Result<Json<Envelope<ArticleListResponse>>, ApiError> {
    Ok(ok(db::list_articles(&state.db, &query).await?))
}

/// POST /api/admin/articles
pub async fn create_article(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Json(request): Json<CreateArticle>,
) -> Result<Json<Envelope<Article>>, ApiError> {
    validate_title(&request.title).map_err(ApiError::bad_request)?;
    if db::get_category(&state.db, request.category_id)
        .await?
        .is_none()
    {
        return Err(ApiError::bad_request("category does not exist"));
    }

    let article = db::create_article(&state.db, admin.0.sub, &request).await?;
    Ok(ok(article))
}

/// PUT /api/admin/articles/:id
pub async fn update_article(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateArticle>,
) -> Result<Json<Envelope<Article>>, ApiError> {
    if let Some(title) = &request.title {
        validate_title(title).map_err(ApiError::bad_request)?;
    }
    if let Some(category_id) = request.category_id {
        if db::get_category(&state.db, category_id).await?.is_none() {
            return Err(ApiError::bad_request("category does not exist"));
        }
    }

    let article = db::update_article(&state.db, id, &request)
        .await?
        .ok_or_else(|| ApiError::not_found("article not found"))?;
    Ok(ok(article))
}

/// DELETE /api/admin/articles/:id
pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<()>>, ApiError> {
    if !db::delete_article(&state.db, id).await? {
        return Err(ApiError::not_found("article not found"));
    }
    Ok(ok_message("article deleted"))
}

// ---------------------------------------------------------------------------
// Category management
// ---------------------------------------------------------------------------

/// POST /api/admin/categories
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(request): Json<CreateCategory>,
) -> Result<Json<Envelope<Category>>, ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    validate_slug(&request.slug).map_err(ApiError::bad_request)?;

    let category = db::create_category(&state.db, &request).await?;
    Ok(ok(category))
}

/// PUT /api/admin/categories/:id
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateCategory>,
) -> Result<Json<Envelope<Category>>, ApiError> {
    if let Some(slug) = &request.slug {
        validate_slug(slug).map_err(ApiError::bad_request)?;
    }

    let category = db::update_category(&state.db, id, &request)
        .await?
        .ok_or_else(|| ApiError::not_found("category not found"))?;
    Ok(ok(category))
}

/// DELETE /api/admin/categories/:id
///
/// Refused while any article still references the category.
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<()>>, ApiError> {
    if db::get_category(&state.db, id).await?.is_none() {
        return Err(ApiError::not_found("category not found"));
    }

    let in_use = db::count_category_articles(&state.db, id).await?;
    if in_use > 0 {
        return Err(ApiError::conflict(format!(
            "category still has {in_use} articles"
        )));
    }

    db::delete_category(&state.db, id).await?;
    Ok(ok_message("category deleted"))
}

// ---------------------------------------------------------------------------
// Comment moderation
// ---------------------------------------------------------------------------

/// GET /api/admin/comments
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<CommentQuery>,
) -> Result<Json<Envelope<CommentListResponse>>, ApiError> {
    Ok(ok(db::list_comments(&state.db, &query).await?))
}

#[derive(Debug, Deserialize)]
pub struct ModerateCommentRequest {
    pub status: CommentStatus,
}

/// PUT /api/admin/comments/:id/status
pub async fn moderate_comment(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(request): Json<ModerateCommentRequest>,
) -> Result<Json<Envelope<Comment>>, ApiError> {
    if !db::set_comment_status(&state.db, id, request.status).await? {
        return Err(ApiError::not_found("comment not found"));
    }
    let comment = db::get_comment(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("comment not found"))?;
    Ok(ok(comment))
}

/// DELETE /api/admin/comments/:id
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<()>>, ApiError> {
    if !db::delete_comment(&state.db, id).await? {
        return Err(ApiError::not_found("comment not found"));
    }
    Ok(ok_message("comment deleted"))
}
