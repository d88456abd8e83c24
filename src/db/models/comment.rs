//! Comment model and one-level thread assembly.
//!
//! Comments are stored flat with an optional parent reference. The read
//! path pages over top-level comments only and eagerly attaches each one's
//! direct replies; replies are not independently paginated.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;

use super::article::Bind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Approved => "approved",
            CommentStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct CommentRow {
    id: i64,
    article_id: i64,
    user_id: i64,
    username: Option<String>,
    user_avatar: Option<String>,
    content: String,
    parent_id: Option<i64>,
    likes: i64,
    status: CommentStatus,
    created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub article_id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub user_avatar: Option<String>,
    pub content: String,
    pub parent_id: Option<i64>,
    pub likes: i64,
    pub status: CommentStatus,
    pub created_at: String,
    /// Direct replies, oldest first. Empty on reply entries.
    pub replies: Vec<Comment>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            article_id: row.article_id,
            user_id: row.user_id,
            username: row.username,
            user_avatar: row.user_avatar,
            content: row.content,
            parent_id: row.parent_id,
            likes: row.likes,
            status: row.status,
            created_at: row.created_at,
            replies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentQuery {
    pub article_id: Option<i64>,
    pub user_id: Option<i64>,
    pub status: Option<CommentStatus>,
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<i64>,
    /// Items per page (defaults to 20, max 100)
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentListResponse {
    pub list: Vec<Comment>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

const COMMENT_SELECT: &str = "SELECT cm.id, cm.article_id, cm.user_id, \
     u.username AS username, u.avatar AS user_avatar, cm.content, cm.parent_id, \
     cm.likes, cm.status, cm.created_at \
     FROM comments cm LEFT JOIN users u ON u.id = cm.user_id";

/// Page over top-level comments matching the filter, newest first, each
/// annotated with its direct replies in creation order. `total` counts
/// matching top-level rows only.
pub async fn list_comments(
    db: &SqlitePool,
    query: &CommentQuery,
) -> Result<CommentListResponse, sqlx::Error> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * page_size;

    let mut conditions = vec!["cm.parent_id IS NULL".to_string()];
    let mut bindings = Vec::new();

    if let Some(article_id) = query.article_id {
        conditions.push("cm.article_id = ?".to_string());
        bindings.push(Bind::Int(article_id));
    }
    if let Some(user_id) = query.user_id {
        conditions.push("cm.user_id = ?".to_string());
        bindings.push(Bind::Int(user_id));
    }
    if let Some(status) = query.status {
        conditions.push("cm.status = ?".to_string());
        bindings.push(Bind::Text(status.as_str().to_string()));
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));

    let count_sql = format!("SELECT COUNT(*) FROM comments cm {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for binding in &bindings {
        count_query = match binding {
            Bind::Int(v) => count_query.bind(*v),
            Bind::Text(v) => count_query.bind(v),
        };
    }
    let total = count_query.fetch_one(db).await?;

    let sql = format!(
        "{} {} ORDER BY cm.created_at DESC, cm.id DESC LIMIT ? OFFSET ?",
        COMMENT_SELECT, where_clause
    );
    let mut rows_query = sqlx::query_as::<_, CommentRow>(&sql);
    for binding in &bindings {
        rows_query = match binding {
            Bind::Int(v) => rows_query.bind(*v),
            Bind::Text(v) => rows_query.bind(v),
        };
    }
    let rows = rows_query.bind(page_size).bind(offset).fetch_all(db).await?;

    let mut list: Vec<Comment> = rows.into_iter().map(Comment::from).collect();
    attach_replies(db, &mut list, query.status).await?;

    Ok(CommentListResponse {
        list,
        total,
        page,
        page_size,
    })
}

/// Eagerly fetch the direct replies for a page of top-level comments.
/// The listing's status filter applies to replies too, so a moderated
/// view never carries unmoderated children.
async fn attach_replies(
    db: &SqlitePool,
    parents: &mut [Comment],
    status: Option<CommentStatus>,
) -> Result<(), sqlx::Error> {
    if parents.is_empty() {
        return Ok(());
    }

    let placeholders = vec!["?"; parents.len()].join(", ");
    let status_clause = if status.is_some() {
        " AND cm.status = ?"
    } else {
        ""
    };
    let sql = format!(
        "{} WHERE cm.parent_id IN ({}){} ORDER BY cm.created_at ASC, cm.id ASC",
        COMMENT_SELECT, placeholders, status_clause
    );
    let mut query = sqlx::query_as::<_, CommentRow>(&sql);
    for parent in parents.iter() {
        query = query.bind(parent.id);
    }
    if let Some(status) = status {
        query = query.bind(status);
    }
    let rows = query.fetch_all(db).await?;

    let mut by_parent: HashMap<i64, Vec<Comment>> = HashMap::new();
    for row in rows {
        if let Some(parent_id) = row.parent_id {
            by_parent.entry(parent_id).or_default().push(Comment::from(row));
        }
    }
    for parent in parents.iter_mut() {
        if let Some(replies) = by_parent.remove(&parent.id) {
            parent.replies = replies;
        }
    }
    Ok(())
}

pub async fn get_comment(db: &SqlitePool, id: i64) -> Result<Option<Comment>, sqlx::Error> {
    let sql = format!("{} WHERE cm.id = ?", COMMENT_SELECT);
    let row: Option<CommentRow> = sqlx::query_as(&sql).bind(id).fetch_optional(db).await?;
    Ok(row.map(Comment::from))
}

/// Insert a comment. The production create path always starts at pending;
/// moderation flips it to approved or rejected later.
pub async fn create_comment(
    db: &SqlitePool,
    article_id: i64,
    user_id: i64,
    content: &str,
    parent_id: Option<i64>,
) -> Result<Comment, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO comments (article_id, user_id, content, parent_id, status) \
         VALUES (?, ?, ?, ?, 'pending')",
    )
    .bind(article_id)
    .bind(user_id)
    .bind(content)
    .bind(parent_id)
    .execute(db)
    .await?;

    let sql = format!("{} WHERE cm.id = ?", COMMENT_SELECT);
    let row: CommentRow = sqlx::query_as(&sql)
        .bind(result.last_insert_rowid())
        .fetch_one(db)
        .await?;
    Ok(Comment::from(row))
}

/// Atomic like counter bump, mirroring the view-counter rule.
pub async fn like_comment(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE comments SET likes = likes + 1 WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_comment_status(
    db: &SqlitePool,
    id: i64,
    status: CommentStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE comments SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_comment(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::article::ArticleStatus;
    use crate::db::models::user::{create_user, Role};
    use crate::db::test_pool;

    async fn seed_article(db: &SqlitePool) -> (i64, i64) {
        let user = create_user(db, "carol", "carol@example.com", "h", Role::User)
            .await
            .unwrap();
        let cat = sqlx::query("INSERT INTO categories (name, slug, sort_order) VALUES ('News', 'news', 1)")
            .execute(db)
            .await
            .unwrap()
            .last_insert_rowid();
        let article = sqlx::query(
            "INSERT INTO articles (title, content, summary, category_id, author_id, status) \
             VALUES ('t', 'c', 's', ?, ?, ?)",
        )
        .bind(cat)
        .bind(user.id)
        .bind(ArticleStatus::Published)
        .execute(db)
        .await
        .unwrap()
        .last_insert_rowid();
        (article, user.id)
    }

    #[tokio::test]
    async fn test_new_comments_start_pending() {
        let db = test_pool().await;
        let (article, user) = seed_article(&db).await;

        let comment = create_comment(&db, article, user, "first!", None).await.unwrap();
        assert_eq!(comment.status, CommentStatus::Pending);
        assert_eq!(comment.username.as_deref(), Some("carol"));
    }

    #[tokio::test]
    async fn test_replies_nest_and_never_appear_top_level() {
        let db = test_pool().await;
        let (article, user) = seed_article(&db).await;

        let top = create_comment(&db, article, user, "top", None).await.unwrap();
        let reply = create_comment(&db, article, user, "reply", Some(top.id))
            .await
            .unwrap();

        let result = list_comments(
            &db,
            &CommentQuery {
                article_id: Some(article),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(result.total, 1);
        assert_eq!(result.list.len(), 1);
        assert_eq!(result.list[0].id, top.id);
        assert_eq!(result.list[0].replies.len(), 1);
        assert_eq!(result.list[0].replies[0].id, reply.id);
    }

    #[tokio::test]
    async fn test_replies_ordered_oldest_first() {
        let db = test_pool().await;
        let (article, user) = seed_article(&db).await;

        let top = create_comment(&db, article, user, "top", None).await.unwrap();
        let first = create_comment(&db, article, user, "r1", Some(top.id)).await.unwrap();
        let second = create_comment(&db, article, user, "r2", Some(top.id)).await.unwrap();

        let result = list_comments(
            &db,
            &CommentQuery {
                article_id: Some(article),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let replies: Vec<i64> = result.list[0].replies.iter().map(|r| r.id).collect();
        assert_eq!(replies, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_status_filter_applies_to_replies_too() {
        let db = test_pool().await;
        let (article, user) = seed_article(&db).await;

        let top = create_comment(&db, article, user, "top", None).await.unwrap();
        let pending = create_comment(&db, article, user, "awaiting review", Some(top.id))
            .await
            .unwrap();
        let approved = create_comment(&db, article, user, "fine", Some(top.id))
            .await
            .unwrap();
        set_comment_status(&db, top.id, CommentStatus::Approved).await.unwrap();
        set_comment_status(&db, approved.id, CommentStatus::Approved)
            .await
            .unwrap();

        let result = list_comments(
            &db,
            &CommentQuery {
                article_id: Some(article),
                status: Some(CommentStatus::Approved),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let reply_ids: Vec<i64> = result.list[0].replies.iter().map(|r| r.id).collect();
        assert_eq!(reply_ids, vec![approved.id]);
        assert!(!reply_ids.contains(&pending.id));

        // The unfiltered (moderation) view still sees both replies.
        let all = list_comments(
            &db,
            &CommentQuery {
                article_id: Some(article),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(all.list[0].replies.len(), 2);
    }

    #[tokio::test]
    async fn test_status_filter_counts_top_level_only() {
        let db = test_pool().await;
        let (article, user) = seed_article(&db).await;

        let a = create_comment(&db, article, user, "a", None).await.unwrap();
        create_comment(&db, article, user, "b", None).await.unwrap();
        create_comment(&db, article, user, "reply", Some(a.id)).await.unwrap();
        set_comment_status(&db, a.id, CommentStatus::Approved).await.unwrap();

        let approved = list_comments(
            &db,
            &CommentQuery {
                article_id: Some(article),
                status: Some(CommentStatus::Approved),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(approved.total, 1);
        assert_eq!(approved.list[0].id, a.id);
    }

    #[tokio::test]
    async fn test_like_increments_atomically() {
        let db = test_pool().await;
        let (article, user) = seed_article(&db).await;
        let comment = create_comment(&db, article, user, "likeable", None).await.unwrap();

        for _ in 0..3 {
            assert!(like_comment(&db, comment.id).await.unwrap());
        }
        let reread = get_comment(&db, comment.id).await.unwrap().unwrap();
        assert_eq!(reread.likes, 3);

        assert!(!like_comment(&db, 9999).await.unwrap());
    }
}
