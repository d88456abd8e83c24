//! Public comment endpoints: per-article threads, posting, and likes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::error::{ok, ok_message, ApiError, Envelope};
use crate::api::extract::AuthUser;
use crate::api::validation::validate_comment_content;
use crate::db::{self, ArticleStatus, Comment, CommentListResponse, CommentQuery, CommentStatus};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    pub parent_id: Option<i64>,
}

async fn published_article(state: &AppState, id: i64) -> Result<db::Article, ApiError> {
    let article = db::get_article(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("article not found"))?;
    if article.status != ArticleStatus::Published {
        return Err(ApiError::not_found("article not found"));
    }
    Ok(article)
}

/// GET /api/articles/:id/comments
///
/// Public readers only ever see approved comments.
pub async fn list_for_article(
    State(state): State<Arc<AppState>>,
    Path(article_id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Envelope<CommentListResponse>>, ApiError> {
    published_article(&state, article_id).await?;

    let result = db::list_comments(
        &state.db,
        &CommentQuery {
            article_id: Some(article_id),
            status: Some(CommentStatus::Approved),
            page: page.page,
            page_size: page.page_size,
            ..Default::default()
        },
    )
    .await?;
    Ok(ok(result))
}

/// POST /api/articles/:id/comments
///
/// Threads are one level deep: a reply's parent must itself be a
/// top-level comment on the same article.
pub async fn create(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(article_id): Path<i64>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<Json<Envelope<Comment>>, ApiError> {
    validate_comment_content(&request.content).map_err(ApiError::bad_request)?;
    published_article(&state, article_id).await?;

    if let Some(parent_id) = request.parent_id {
        let parent = db::get_comment(&state.db, parent_id)
            .await?
            .ok_or_else(|| ApiError::not_found("parent comment not found"))?;
        if parent.article_id != article_id {
            return Err(ApiError::bad_request(
                "parent comment belongs to a different article",
            ));
        }
        if parent.parent_id.is_some() {
            return Err(ApiError::bad_request("replies cannot be nested"));
        }
    }

    let comment = db::create_comment(
        &state.db,
        article_id,
        user.0.sub,
        &request.content,
        request.parent_id,
    )
    .await?;
    Ok(ok(comment))
}

/// POST /api/comments/:id/like
pub async fn like(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<()>>, ApiError> {
    if !db::like_comment(&state.db, id).await? {
        return Err(ApiError::not_found("comment not found"));
    }
    Ok(ok_message("liked"))
}
