//! First-run data: the default category set and the bootstrap admin
//! account. Both are idempotent so restarts never duplicate rows.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;

use crate::api::auth::hash_password;
use crate::config::AuthConfig;

const DEFAULT_CATEGORIES: &[(&str, &str, i64)] = &[
    ("Politics", "politics", 1),
    ("Society", "society", 2),
    ("International", "international", 3),
    ("Military", "military", 4),
    ("Finance", "finance", 5),
    ("Sports", "sports", 6),
    ("Entertainment", "entertainment", 7),
    ("Tech", "tech", 8),
];

/// Insert the default categories unless the table already has content.
pub async fn seed_categories(db: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(db)
        .await?;
    if count > 0 {
        return Ok(());
    }

    for (name, slug, sort_order) in DEFAULT_CATEGORIES {
        sqlx::query("INSERT INTO categories (name, slug, sort_order) VALUES (?, ?, ?)")
            .bind(name)
            .bind(slug)
            .bind(sort_order)
            .execute(db)
            .await?;
    }
    info!("Seeded {} default categories", DEFAULT_CATEGORIES.len());
    Ok(())
}

/// Make sure the bootstrap admin exists. On a fresh database this account
/// becomes row 1 and therefore the super admin.
pub async fn ensure_super_admin(db: &SqlitePool, auth: &AuthConfig) -> Result<()> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(&auth.admin_email)
        .fetch_one(db)
        .await?;
    if existing > 0 {
        return Ok(());
    }

    let hash = hash_password(&auth.admin_password)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("hashing bootstrap admin password")?;
    sqlx::query("INSERT INTO users (username, email, password_hash, role) VALUES (?, ?, ?, 'admin')")
        .bind("admin")
        .bind(&auth.admin_email)
        .bind(&hash)
        .execute(db)
        .await?;
    info!("Created bootstrap admin account {}", auth.admin_email);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn test_auth() -> AuthConfig {
        AuthConfig {
            admin_email: "admin@portal.local".to_string(),
            admin_password: "admin123".to_string(),
            ..AuthConfig::default()
        }
    }

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let db = test_pool().await;
        seed_categories(&db).await.unwrap();
        seed_categories(&db).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(count, 8);
    }

    #[tokio::test]
    async fn test_bootstrap_admin_is_first_row() {
        let db = test_pool().await;
        let auth = test_auth();
        ensure_super_admin(&db, &auth).await.unwrap();
        ensure_super_admin(&db, &auth).await.unwrap();

        let admin = crate::db::models::get_user_by_email(&db, &auth.admin_email)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.id, 1);
        assert_eq!(admin.role, crate::db::models::Role::Admin);
    }
}
