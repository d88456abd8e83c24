//! User model and identity queries.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Disabled,
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar: user.avatar,
            role: user.role,
            status: user.status,
            created_at: user.created_at,
        }
    }
}

pub async fn get_user_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(db)
        .await
}

pub async fn get_user_by_id(db: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Insert a user. Email uniqueness is enforced by the database, so a
/// concurrent duplicate registration surfaces as a constraint error rather
/// than slipping past an existence check.
pub async fn create_user(
    db: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<User, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO users (username, email, password_hash, role) VALUES (?, ?, ?, ?)",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .execute(db)
    .await?;

    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(db)
        .await
}

pub async fn update_user_info(
    db: &SqlitePool,
    id: i64,
    username: Option<&str>,
    avatar: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
    if username.is_some() || avatar.is_some() {
        let mut sets = Vec::new();
        let mut bindings = Vec::new();
        if let Some(username) = username {
            sets.push("username = ?");
            bindings.push(username);
        }
        if let Some(avatar) = avatar {
            sets.push("avatar = ?");
            bindings.push(avatar);
        }

        let sql = format!(
            "UPDATE users SET {}, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?",
            sets.join(", ")
        );
        let mut query = sqlx::query(&sql);
        for binding in bindings {
            query = query.bind(binding);
        }
        query.bind(id).execute(db).await?;
    }

    get_user_by_id(db, id).await
}

pub async fn update_password(
    db: &SqlitePool,
    id: i64,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE users SET password_hash = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
         WHERE id = ?",
    )
    .bind(password_hash)
    .bind(id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn list_admins(db: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE role = 'admin' ORDER BY id")
        .fetch_all(db)
        .await
}

pub async fn delete_user(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
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
    async fn test_duplicate_email_is_rejected_by_the_database() {
        let db = test_pool().await;

        create_user(&db, "first", "dup@example.com", "hash", Role::User)
            .await
            .unwrap();
        let err = create_user(&db, "second", "dup@example.com", "hash", Role::User)
            .await
            .unwrap_err();

        match err {
            sqlx::Error::Database(db_err) => {
                assert!(db_err.message().contains("UNIQUE constraint failed"))
            }
            other => panic!("expected database error, got {other:?}"),
        }

        // No partial row persisted for the second attempt.
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind("dup@example.com")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_user_response_has_no_hash() {
        let db = test_pool().await;
        let user = create_user(&db, "alice", "alice@example.com", "secret-hash", Role::User)
            .await
            .unwrap();

        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
    }

    #[tokio::test]
    async fn test_list_admins_filters_by_role() {
        let db = test_pool().await;
        create_user(&db, "root", "root@example.com", "h", Role::Admin)
            .await
            .unwrap();
        create_user(&db, "bob", "bob@example.com", "h", Role::User)
            .await
            .unwrap();

        let admins = list_admins(&db).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].username, "root");
    }
}
