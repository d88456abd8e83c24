//! Favorite pairs (user, article).

use sqlx::SqlitePool;

use super::article::{Article, ArticleListResponse};

/// Record a favorite. Duplicates are a no-op thanks to the unique pair
/// constraint; returns whether a new row was inserted.
pub async fn add_favorite(
    db: &SqlitePool,
    user_id: i64,
    article_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("INSERT OR IGNORE INTO favorites (user_id, article_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(article_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn remove_favorite(
    db: &SqlitePool,
    user_id: i64,
    article_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND article_id = ?")
        .bind(user_id)
        .bind(article_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn is_favorited(
    db: &SqlitePool,
    user_id: i64,
    article_id: i64,
) -> Result<bool, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM favorites WHERE user_id = ? AND article_id = ?")
            .bind(user_id)
            .bind(article_id)
            .fetch_one(db)
            .await?;
    Ok(count > 0)
}

/// A user's favorited articles, most recently favorited first.
pub async fn list_favorites(
    db: &SqlitePool,
    user_id: i64,
    page: i64,
    page_size: i64,
) -> Result<ArticleListResponse, sqlx::Error> {
    let page = page.max(1);
    let page_size = page_size.clamp(1, 100);
    let offset = (page - 1) * page_size;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favorites WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(db)
        .await?;

    let rows = sqlx::query_as::<_, super::article::ArticleRow>(
        "SELECT a.id, a.title, a.content, a.summary, a.cover, \
         a.category_id, c.name AS category_name, a.author_id, u.username AS author_name, \
         a.views, a.status, a.tags, a.created_at, a.updated_at \
         FROM favorites f \
         JOIN articles a ON a.id = f.article_id \
         LEFT JOIN categories c ON c.id = a.category_id \
         LEFT JOIN users u ON u.id = a.author_id \
         WHERE f.user_id = ? \
         ORDER BY f.created_at DESC, f.id DESC LIMIT ? OFFSET ?",
    )
    .bind(user_id)
    .bind(page_size)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(ArticleListResponse {
        list: rows.into_iter().map(Article::from).collect(),
        total,
        page,
        page_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::article::ArticleStatus;
    use crate::db::models::user::{create_user, Role};
    use crate::db::test_pool;

    async fn seed_article(db: &SqlitePool) -> (i64, i64) {
        let user = create_user(db, "dave", "dave@example.com", "h", Role::User)
            .await
            .unwrap();
        let cat = sqlx::query("INSERT INTO categories (name, slug, sort_order) VALUES ('N', 'n', 1)")
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
    async fn test_duplicate_favorite_is_a_noop() {
        let db = test_pool().await;
        let (article, user) = seed_article(&db).await;

        assert!(add_favorite(&db, user, article).await.unwrap());
        // Second insert neither errors nor adds a row.
        assert!(!add_favorite(&db, user, article).await.unwrap());

        let favorites = list_favorites(&db, user, 1, 20).await.unwrap();
        assert_eq!(favorites.total, 1);
    }

    #[tokio::test]
    async fn test_remove_favorite() {
        let db = test_pool().await;
        let (article, user) = seed_article(&db).await;

        add_favorite(&db, user, article).await.unwrap();
        assert!(is_favorited(&db, user, article).await.unwrap());
        assert!(remove_favorite(&db, user, article).await.unwrap());
        assert!(!is_favorited(&db, user, article).await.unwrap());
        assert!(!remove_favorite(&db, user, article).await.unwrap());
    }
}
