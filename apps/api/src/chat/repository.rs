use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::chat::{ChatMessage, MessageType};
use crate::models::user::Role;

pub struct NewMessage<'a> {
    pub room_id: &'a str,
    pub sender_id: Uuid,
    pub sender_name: &'a str,
    pub sender_role: Role,
    pub content: &'a str,
    pub message_type: MessageType,
    pub reply_to: Option<Uuid>,
}

pub async fn list_room(pool: &SqlitePool, room_id: &str) -> Result<Vec<ChatMessage>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM chat_messages WHERE room_id = ? ORDER BY created_at ASC")
        .bind(room_id)
        .fetch_all(pool)
        .await
}

/// Messages created strictly after `since`, oldest first.
pub async fn list_room_since(
    pool: &SqlitePool,
    room_id: &str,
    since: DateTime<Utc>,
) -> Result<Vec<ChatMessage>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM chat_messages WHERE room_id = ? AND created_at > ? ORDER BY created_at ASC")
        .bind(room_id)
        .bind(since)
        .fetch_all(pool)
        .await
}

pub async fn get_message(pool: &SqlitePool, id: Uuid) -> Result<Option<ChatMessage>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM chat_messages WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_message(
    pool: &SqlitePool,
    new: NewMessage<'_>,
    now: DateTime<Utc>,
) -> Result<ChatMessage, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO chat_messages
            (id, room_id, sender_id, sender_name, sender_role, content, message_type, reply_to, is_edited, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.room_id)
    .bind(new.sender_id)
    .bind(new.sender_name)
    .bind(new.sender_role)
    .bind(new.content)
    .bind(new.message_type)
    .bind(new.reply_to)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn update_content(
    pool: &SqlitePool,
    id: Uuid,
    content: &str,
    now: DateTime<Utc>,
) -> Result<Option<ChatMessage>, sqlx::Error> {
    sqlx::query_as("UPDATE chat_messages SET content = ?, is_edited = 1, edited_at = ? WHERE id = ? RETURNING *")
        .bind(content)
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn delete_message(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM chat_messages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
