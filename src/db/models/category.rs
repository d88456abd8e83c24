//! Category model.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub sort_order: i64,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i64>,
}

pub async fn list_categories(db: &SqlitePool) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM categories ORDER BY sort_order ASC, id ASC")
        .fetch_all(db)
        .await
}

pub async fn get_category(db: &SqlitePool, id: i64) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Slug uniqueness is enforced by the database; duplicates surface as a
/// constraint error.
pub async fn create_category(
    db: &SqlitePool,
    req: &CreateCategory,
) -> Result<Category, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO categories (name, slug, description, sort_order) VALUES (?, ?, ?, ?)",
    )
    .bind(&req.name)
    .bind(&req.slug)
    .bind(&req.description)
    .bind(req.sort_order)
    .execute(db)
    .await?;

    sqlx::query_as("SELECT * FROM categories WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(db)
        .await
}

pub async fn update_category(
    db: &SqlitePool,
    id: i64,
    req: &UpdateCategory,
) -> Result<Option<Category>, sqlx::Error> {
    let mut sets = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(name) = &req.name {
        sets.push("name = ?");
        bindings.push(name.clone());
    }
    if let Some(slug) = &req.slug {
        sets.push("slug = ?");
        bindings.push(slug.clone());
    }
    if let Some(description) = &req.description {
        sets.push("description = ?");
        bindings.push(description.clone());
    }
    if let Some(sort_order) = req.sort_order {
        sets.push("sort_order = ?");
        bindings.push(sort_order.to_string());
    }

    if !sets.is_empty() {
        let sql = format!("UPDATE categories SET {} WHERE id = ?", sets.join(", "));
        let mut query = sqlx::query(&sql);
        for binding in &bindings {
            query = query.bind(binding);
        }
        query.bind(id).execute(db).await?;
    }

    get_category(db, id).await
}

/// How many articles still reference this category. Deletion is refused
/// while this is non-zero.
pub async fn count_category_articles(db: &SqlitePool, id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE category_id = ?")
        .bind(id)
        .fetch_one(db)
        .await
}

pub async fn delete_category(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_categories_sorted_by_sort_order() {
        let db = test_pool().await;
        for (name, slug, sort) in [("B", "b", 2), ("A", "a", 1), ("C", "c", 3)] {
            create_category(
                &db,
                &CreateCategory {
                    name: name.to_string(),
                    slug: slug.to_string(),
                    description: None,
                    sort_order: sort,
                },
            )
            .await
            .unwrap();
        }

        let names: Vec<String> = list_categories(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_delete_is_restricted_while_articles_reference_it() {
        let db = test_pool().await;
        let cat = create_category(
            &db,
            &CreateCategory {
                name: "News".to_string(),
                slug: "news".to_string(),
                description: None,
                sort_order: 0,
            },
        )
        .await
        .unwrap();
        sqlx::query("INSERT INTO users (username, email, password_hash) VALUES ('a', 'a@b.c', 'h')")
            .execute(&db)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO articles (title, content, summary, category_id, author_id) \
             VALUES ('t', 'c', 's', ?, 1)",
        )
        .bind(cat.id)
        .execute(&db)
        .await
        .unwrap();

        assert_eq!(count_category_articles(&db, cat.id).await.unwrap(), 1);
        // ON DELETE RESTRICT backs the application-level refusal.
        assert!(delete_category(&db, cat.id).await.is_err());

        sqlx::query("DELETE FROM articles WHERE category_id = ?")
            .bind(cat.id)
            .execute(&db)
            .await
            .unwrap();
        assert!(delete_category(&db, cat.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_rejected() {
        let db = test_pool().await;
        let req = CreateCategory {
            name: "Tech".to_string(),
            slug: "tech".to_string(),
            description: None,
            sort_order: 0,
        };
        create_category(&db, &req).await.unwrap();
        assert!(create_category(&db, &req).await.is_err());
    }
}
