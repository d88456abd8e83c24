//! Article model and the listing query service.
//!
//! Listing composes filters (category, status, keyword), a whitelisted sort
//! field with direction, and offset pagination into a single query pair:
//! one count of every matching row, one page of results.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Published,
    Archived,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
            ArticleStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    CreatedAt,
    Views,
    UpdatedAt,
}

impl SortField {
    /// Whitelisted column name; sort input never reaches SQL as raw text.
    fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Views => "views",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Query parameters for article listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleQuery {
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<i64>,
    /// Items per page (defaults to 20, max 100)
    pub page_size: Option<i64>,
    /// Filter by category (exact match)
    pub category_id: Option<i64>,
    /// Filter by status; defaults to published. Handlers force this to
    /// published for non-admin callers so drafts never leak.
    pub status: Option<ArticleStatus>,
    /// Case-insensitive substring match against title OR summary
    pub keyword: Option<String>,
    /// Sort field (createdAt, views, updatedAt; defaults to createdAt)
    pub sort: Option<SortField>,
    /// Sort direction (defaults to desc)
    pub order: Option<SortOrder>,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct ArticleRow {
    id: i64,
    title: String,
    content: String,
    summary: String,
    cover: Option<String>,
    category_id: i64,
    category_name: Option<String>,
    author_id: i64,
    author_name: Option<String>,
    views: i64,
    status: ArticleStatus,
    tags: String,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub cover: Option<String>,
    pub category_id: i64,
    pub category_name: Option<String>,
    pub author_id: i64,
    pub author_name: Option<String>,
    pub views: i64,
    pub status: ArticleStatus,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            summary: row.summary,
            cover: row.cover,
            category_id: row.category_id,
            category_name: row.category_name,
            author_id: row.author_id,
            author_name: row.author_name,
            views: row.views,
            status: row.status,
            // Tags are stored as a JSON array in a TEXT column
            tags: serde_json::from_str(&row.tags).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleListResponse {
    pub list: Vec<Article>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

/// Heterogeneous bind values for dynamically built WHERE clauses.
pub(crate) enum Bind {
    Int(i64),
    Text(String),
}

const ARTICLE_SELECT: &str = "SELECT a.id, a.title, a.content, a.summary, a.cover, \
     a.category_id, c.name AS category_name, a.author_id, u.username AS author_name, \
     a.views, a.status, a.tags, a.created_at, a.updated_at \
     FROM articles a \
     LEFT JOIN categories c ON c.id = a.category_id \
     LEFT JOIN users u ON u.id = a.author_id";

/// List articles with filtering, sorting and pagination.
///
/// `total` counts every row matching the filter, independent of the page, so
/// callers can compute the page count.
pub async fn list_articles(
    db: &SqlitePool,
    query: &ArticleQuery,
) -> Result<ArticleListResponse, sqlx::Error> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * page_size;

    let status = query.status.unwrap_or(ArticleStatus::Published);
    let mut conditions = vec!["a.status = ?".to_string()];
    let mut bindings = vec![Bind::Text(status.as_str().to_string())];

    if let Some(category_id) = query.category_id {
        conditions.push("a.category_id = ?".to_string());
        bindings.push(Bind::Int(category_id));
    }

    if let Some(keyword) = query.keyword.as_deref().filter(|k| !k.is_empty()) {
        conditions.push("(a.title LIKE ? OR a.summary LIKE ?)".to_string());
        let pattern = format!("%{}%", keyword);
        bindings.push(Bind::Text(pattern.clone()));
        bindings.push(Bind::Text(pattern));
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));

    let count_sql = format!("SELECT COUNT(*) FROM articles a {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for binding in &bindings {
        count_query = match binding {
            Bind::Int(v) => count_query.bind(*v),
            Bind::Text(v) => count_query.bind(v),
        };
    }
    let total = count_query.fetch_one(db).await?;

    let sort = query.sort.unwrap_or(SortField::CreatedAt);
    let order = query.order.unwrap_or(SortOrder::Desc);

    // The id tie-break keeps pagination stable when sort keys collide.
    let sql = format!(
        "{} {} ORDER BY a.{} {}, a.id DESC LIMIT ? OFFSET ?",
        ARTICLE_SELECT,
        where_clause,
        sort.column(),
        order.keyword()
    );
    let mut rows_query = sqlx::query_as::<_, ArticleRow>(&sql);
    for binding in &bindings {
        rows_query = match binding {
            Bind::Int(v) => rows_query.bind(*v),
            Bind::Text(v) => rows_query.bind(v),
        };
    }
    let rows = rows_query.bind(page_size).bind(offset).fetch_all(db).await?;

    Ok(ArticleListResponse {
        list: rows.into_iter().map(Article::from).collect(),
        total,
        page,
        page_size,
    })
}

pub async fn get_article(db: &SqlitePool, id: i64) -> Result<Option<Article>, sqlx::Error> {
    let sql = format!("{} WHERE a.id = ?", ARTICLE_SELECT);
    let row: Option<ArticleRow> = sqlx::query_as(&sql).bind(id).fetch_optional(db).await?;
    Ok(row.map(Article::from))
}

/// Bump the view counter. A single UPDATE at the database, so concurrent
/// detail reads never lose increments.
pub async fn increment_views(db: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE articles SET views = views + 1 WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// Most-viewed published articles.
pub async fn hot_articles(db: &SqlitePool, limit: i64) -> Result<Vec<Article>, sqlx::Error> {
    let sql = format!(
        "{} WHERE a.status = 'published' ORDER BY a.views DESC, a.id DESC LIMIT ?",
        ARTICLE_SELECT
    );
    let rows: Vec<ArticleRow> = sqlx::query_as(&sql).bind(limit).fetch_all(db).await?;
    Ok(rows.into_iter().map(Article::from).collect())
}

/// Random sample of published articles. Order is intentionally not
/// reproducible; every published article is eligible.
pub async fn recommend_articles(db: &SqlitePool, limit: i64) -> Result<Vec<Article>, sqlx::Error> {
    let sql = format!(
        "{} WHERE a.status = 'published' ORDER BY RANDOM() LIMIT ?",
        ARTICLE_SELECT
    );
    let rows: Vec<ArticleRow> = sqlx::query_as(&sql).bind(limit).fetch_all(db).await?;
    Ok(rows.into_iter().map(Article::from).collect())
}

/// Published articles sharing the subject's category, most viewed first,
/// excluding the subject itself.
pub async fn related_articles(
    db: &SqlitePool,
    category_id: i64,
    exclude_id: i64,
    limit: i64,
) -> Result<Vec<Article>, sqlx::Error> {
    let sql = format!(
        "{} WHERE a.status = 'published' AND a.category_id = ? AND a.id != ? \
         ORDER BY a.views DESC, a.id DESC LIMIT ?",
        ARTICLE_SELECT
    );
    let rows: Vec<ArticleRow> = sqlx::query_as(&sql)
        .bind(category_id)
        .bind(exclude_id)
        .bind(limit)
        .fetch_all(db)
        .await?;
    Ok(rows.into_iter().map(Article::from).collect())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticle {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub cover: Option<String>,
    pub category_id: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: Option<ArticleStatus>,
}

pub async fn create_article(
    db: &SqlitePool,
    author_id: i64,
    req: &CreateArticle,
) -> Result<Article, sqlx::Error> {
    let tags = serde_json::to_string(&req.tags).unwrap_or_else(|_| "[]".to_string());
    let status = req.status.unwrap_or(ArticleStatus::Published);

    let result = sqlx::query(
        "INSERT INTO articles (title, content, summary, cover, category_id, author_id, status, tags) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&req.title)
    .bind(&req.content)
    .bind(&req.summary)
    .bind(&req.cover)
    .bind(req.category_id)
    .bind(author_id)
    .bind(status)
    .bind(&tags)
    .execute(db)
    .await?;

    let sql = format!("{} WHERE a.id = ?", ARTICLE_SELECT);
    let row: ArticleRow = sqlx::query_as(&sql)
        .bind(result.last_insert_rowid())
        .fetch_one(db)
        .await?;
    Ok(Article::from(row))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub cover: Option<String>,
    pub category_id: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub status: Option<ArticleStatus>,
}

pub async fn update_article(
    db: &SqlitePool,
    id: i64,
    req: &UpdateArticle,
) -> Result<Option<Article>, sqlx::Error> {
    let mut sets = Vec::new();
    let mut bindings = Vec::new();

    if let Some(title) = &req.title {
        sets.push("title = ?");
        bindings.push(Bind::Text(title.clone()));
    }
    if let Some(content) = &req.content {
        sets.push("content = ?");
        bindings.push(Bind::Text(content.clone()));
    }
    if let Some(summary) = &req.summary {
        sets.push("summary = ?");
        bindings.push(Bind::Text(summary.clone()));
    }
    if let Some(cover) = &req.cover {
        sets.push("cover = ?");
        bindings.push(Bind::Text(cover.clone()));
    }
    if let Some(category_id) = req.category_id {
        sets.push("category_id = ?");
        bindings.push(Bind::Int(category_id));
    }
    if let Some(tags) = &req.tags {
        sets.push("tags = ?");
        bindings.push(Bind::Text(
            serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string()),
        ));
    }
    if let Some(status) = req.status {
        sets.push("status = ?");
        bindings.push(Bind::Text(status.as_str().to_string()));
    }

    if !sets.is_empty() {
        let sql = format!(
            "UPDATE articles SET {}, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?",
            sets.join(", ")
        );
        let mut query = sqlx::query(&sql);
        for binding in &bindings {
            query = match binding {
                Bind::Int(v) => query.bind(*v),
                Bind::Text(v) => query.bind(v),
            };
        }
        query.bind(id).execute(db).await?;
    }

    get_article(db, id).await
}

/// How many articles a user has authored. Account deletion is refused
/// while this is non-zero so bylines never dangle.
pub async fn count_authored_articles(db: &SqlitePool, author_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(db)
        .await
}

pub async fn delete_article(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM articles WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
