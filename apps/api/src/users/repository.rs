use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::models::user::{Department, Role, User};

/// Fields of a user row that are written on creation.
pub struct NewUser<'a> {
    pub email: &'a str,
    pub full_name: &'a str,
    pub role: Role,
    pub department: Department,
    pub password_hash: &'a str,
}

/// Present fields replace the stored ones.
#[derive(Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub department: Option<Department>,
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users ORDER BY created_at ASC")
        .fetch_all(pool)
        .await
}

pub async fn get_user(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await
}

pub async fn email_taken(pool: &SqlitePool, email: &str, exclude_id: Option<Uuid>) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ? AND (? IS NULL OR id != ?)")
        .bind(email.trim().to_lowercase())
        .bind(exclude_id)
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn count_users(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(pool).await
}

pub async fn insert_user(pool: &SqlitePool, new: NewUser<'_>, now: DateTime<Utc>) -> Result<User, sqlx::Error> {
    let id = Uuid::new_v4();
    let user = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, full_name, role, department, password_hash, is_active, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(new.email.trim().to_lowercase())
    .bind(new.full_name.trim())
    .bind(new.role)
    .bind(new.department)
    .bind(new.password_hash)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    info!("Created user {id} ({:?})", new.role);
    Ok(user)
}

pub async fn update_user(
    pool: &SqlitePool,
    id: Uuid,
    changes: UserChanges,
    now: DateTime<Utc>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE users SET
            email         = COALESCE(?, email),
            full_name     = COALESCE(?, full_name),
            role          = COALESCE(?, role),
            department    = COALESCE(?, department),
            password_hash = COALESCE(?, password_hash),
            is_active     = COALESCE(?, is_active),
            updated_at    = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(changes.email.map(|e| e.trim().to_lowercase()))
    .bind(changes.full_name.map(|n| n.trim().to_string()))
    .bind(changes.role)
    .bind(changes.department)
    .bind(changes.password_hash)
    .bind(changes.is_active)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn touch_last_login(pool: &SqlitePool, id: Uuid, now: DateTime<Utc>) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Returns `false` when no row matched.
pub async fn delete_user(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
