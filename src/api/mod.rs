mod admin;
mod articles;
pub mod auth;
mod categories;
mod comments;
pub mod error;
pub mod extract;
pub mod rate_limit;
mod users;
mod validation;

use axum::{
    http::{StatusCode, Uri},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Credential endpoints get the tight rate limit tier
    let credential_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/admin/login", post(admin::login))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_auth,
        ));

    let api_routes = Router::new()
        // Articles (public)
        .route("/articles", get(articles::list))
        .route("/articles/hot", get(articles::hot))
        .route("/articles/recommend", get(articles::recommend))
        .route("/articles/search", get(articles::search))
        .route("/articles/:id", get(articles::detail))
        .route("/articles/:id/related", get(articles::related))
        // Comments
        .route(
            "/articles/:id/comments",
            get(comments::list_for_article).post(comments::create),
        )
        .route("/comments/:id/like", post(comments::like))
        // Categories (public)
        .route("/categories", get(categories::list))
        .route("/categories/:id", get(categories::detail))
        // Signed-in user
        .route("/user/info", get(users::info).put(users::update_info))
        .route("/user/password", put(users::change_password))
        .route("/user/favorites", get(users::favorites))
        .route(
            "/user/favorites/:articleId",
            post(users::add_favorite).delete(users::remove_favorite),
        )
        // Admin session
        .route("/admin/info", get(admin::info))
        .route("/admin/password", put(admin::change_password))
        // Admin account management (super admin only)
        .route(
            "/admin/admins",
            get(admin::list_admins).post(admin::create_admin),
        )
        .route("/admin/admins/:id", delete(admin::delete_admin))
        // Article management
        .route(
            "/admin/articles",
            get(admin::list_articles).post(admin::create_article),
        )
        .route(
            "/admin/articles/:id",
            put(admin::update_article).delete(admin::delete_article),
        )
        // Category management
        .route("/admin/categories", post(admin::create_category))
        .route(
            "/admin/categories/:id",
            put(admin::update_category).delete(admin::delete_category),
        )
        // Comment moderation
        .route("/admin/comments", get(admin::list_comments))
        .route("/admin/comments/:id", delete(admin::delete_comment))
        .route("/admin/comments/:id/status", put(admin::moderate_comment))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_api,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", credential_routes.merge(api_routes))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

/// Unknown paths get the envelope too, with the path echoed back.
async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "code": 404,
            "message": "not found",
            "path": uri.path(),
        })),
    )
}
