//! Public article endpoints: listing, detail, and the discovery feeds.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::error::{ok, ApiError, Envelope};
use crate::api::extract::MaybeUser;
use crate::db::{self, Article, ArticleListResponse, ArticleQuery, ArticleStatus};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub article: Article,
    /// Whether the calling user has favorited this article. Always false
    /// for anonymous callers.
    pub favorited: bool,
}

/// GET /api/articles
///
/// Anonymous and regular callers always see published articles only; the
/// status filter is honored for admins so the management UI can browse
/// drafts through the same endpoint.
pub async fn list(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Query(mut query): Query<ArticleQuery>,
) -> Result<Json<Envelope<ArticleListResponse>>, ApiError> {
    if !user.is_admin() {
        query.status = Some(ArticleStatus::Published);
    }
    let result = db::list_articles(&state.db, &query).await?;
    Ok(ok(result))
}

/// GET /api/articles/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(mut query): Query<ArticleQuery>,
) -> Result<Json<Envelope<ArticleListResponse>>, ApiError> {
    query.status = Some(ArticleStatus::Published);
    let result = db::list_articles(&state.db, &query).await?;
    Ok(ok(result))
}

/// GET /api/articles/hot
pub async fn hot(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Envelope<Vec<Article>>>, ApiError> {
    let limit = query.limit.unwrap_or(10).clamp(1, 50);
    Ok(ok(db::hot_articles(&state.db, limit).await?))
}

/// GET /api/articles/recommend
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Envelope<Vec<Article>>>, ApiError> {
    let limit = query.limit.unwrap_or(6).clamp(1, 50);
    Ok(ok(db::recommend_articles(&state.db, limit).await?))
}

/// GET /api/articles/:id
///
/// Every successful read bumps the view counter before the row is
/// returned, so the response reflects the caller's own visit.
pub async fn detail(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<ArticleDetail>>, ApiError> {
    let article = db::get_article(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("article not found"))?;

    // Unpublished articles are invisible to non-admins; a 404 rather than
    // a 403 so their existence is not disclosed.
    if article.status != ArticleStatus::Published && !user.is_admin() {
        return Err(ApiError::not_found("article not found"));
    }

    db::increment_views(&state.db, id).await?;

    let favorited = match &user.0 {
        Some(claims) => db::is_favorited(&state.db, claims.sub, id).await?,
        None => false,
    };

    let article = Article {
        views: article.views + 1,
        ..article
    };
    Ok(ok(ArticleDetail { article, favorited }))
}

/// GET /api/articles/:id/related
pub async fn related(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Envelope<Vec<Article>>>, ApiError> {
    let article = db::get_article(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("article not found"))?;

    let limit = query.limit.unwrap_or(5).clamp(1, 20);
    let related = db::related_articles(&state.db, article.category_id, id, limit).await?;
    Ok(ok(related))
}
