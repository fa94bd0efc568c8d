use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, Sse},
    Json,
};
use chrono::{DateTime, Utc};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::candidates::validation::parse_datetime;
use crate::chat::access::ChatScope;
use crate::chat::events::{ChatEvent, PresenceStatus};
use crate::chat::presence::{OnlineUser, Typist};
use crate::chat::repository::{self, NewMessage};
use crate::errors::{AppError, FieldError};
use crate::models::chat::{ChatMessage, MessageType};
use crate::state::AppState;

pub const MAX_MESSAGE_CHARS: usize = 4000;

#[derive(Debug, Default, Deserialize)]
pub struct RoomQuery {
    pub room_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PollQuery {
    pub room_id: Option<String>,
    pub since: Option<String>,
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub room_id: Option<String>,
    pub content: Option<String>,
    pub message_type: Option<MessageType>,
    pub reply_to: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct EditMessageRequest {
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: PresenceStatus,
}

#[derive(Deserialize)]
pub struct TypingRequest {
    pub room_id: Option<String>,
    #[serde(default)]
    pub is_typing: bool,
}

#[derive(Serialize)]
pub struct PollResponse {
    pub messages: Vec<ChatMessage>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct OnlineUsersResponse {
    pub online_users: Vec<OnlineUser>,
}

#[derive(Serialize)]
pub struct TypingResponse {
    pub room_id: String,
    pub typing_users: Vec<Typist>,
}

fn require_room(room_id: Option<&str>) -> Result<String, AppError> {
    room_id
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation("room_id es requerido".into()))
}

fn check_content(content: Option<&str>, errors: &mut Vec<FieldError>) -> String {
    let content = content.map(str::trim).unwrap_or_default();
    if content.is_empty() {
        errors.push(FieldError::new("content", "El mensaje no puede estar vacío"));
    } else if content.chars().count() > MAX_MESSAGE_CHARS {
        errors.push(FieldError::new(
            "content",
            format!("El mensaje no puede exceder {MAX_MESSAGE_CHARS} caracteres"),
        ));
    }
    content.to_string()
}

/// Senders manage their own messages; admins manage everyone's in rooms they can reach.
async fn load_owned_message(state: &AppState, user: &AuthUser, id: Uuid) -> Result<ChatMessage, AppError> {
    let scope = ChatScope::for_user(user)?;
    let message = repository::get_message(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Mensaje {id} no encontrado")))?;
    scope.require(&message.room_id)?;
    if message.sender_id != user.id && !user.role.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(message)
}

/// GET /api/chat/messages?room_id=
pub async fn handle_list_messages(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<RoomQuery>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let scope = ChatScope::for_user(&user)?;
    let room_id = require_room(query.room_id.as_deref())?;
    scope.require(&room_id)?;
    Ok(Json(repository::list_room(&state.db, &room_id).await?))
}

/// POST /api/chat/messages
pub async fn handle_send_message(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), AppError> {
    let scope = ChatScope::for_user(&user)?;
    let mut errors = Vec::new();
    let room_id = req.room_id.as_deref().map(str::trim).unwrap_or_default().to_string();
    if room_id.is_empty() {
        errors.push(FieldError::new("room_id", "La sala es requerida"));
    }
    let content = check_content(req.content.as_deref(), &mut errors);
    if !errors.is_empty() {
        return Err(AppError::InvalidInput(errors));
    }
    scope.require(&room_id)?;

    let message = state
        .chat
        .send_message(
            &state.db,
            NewMessage {
                room_id: &room_id,
                sender_id: user.id,
                sender_name: &user.name,
                sender_role: user.role,
                content: &content,
                message_type: req.message_type.unwrap_or_default(),
                reply_to: req.reply_to,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// PUT /api/chat/messages/:id
pub async fn handle_edit_message(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EditMessageRequest>,
) -> Result<Json<ChatMessage>, AppError> {
    load_owned_message(&state, &user, id).await?;

    let mut errors = Vec::new();
    let content = check_content(req.content.as_deref(), &mut errors);
    if !errors.is_empty() {
        return Err(AppError::InvalidInput(errors));
    }

    let message = repository::update_content(&state.db, id, &content, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Mensaje {id} no encontrado")))?;
    state.chat.broadcaster.publish(ChatEvent::MessageUpdated { message: message.clone() });
    Ok(Json(message))
}

/// DELETE /api/chat/messages/:id
pub async fn handle_delete_message(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let message = load_owned_message(&state, &user, id).await?;
    if repository::delete_message(&state.db, id).await? {
        state.chat.broadcaster.publish(ChatEvent::MessageDeleted {
            message_id: id,
            room_id: message.room_id,
        });
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Cursor for the next poll: the newest instant up to which every message is
/// known to be delivered. Never wall-clock time, which can run ahead of
/// messages still being written.
pub fn poll_cursor(
    since: Option<DateTime<Utc>>,
    messages: &[ChatMessage],
    committed: DateTime<Utc>,
) -> DateTime<Utc> {
    let newest = messages.last().map(|m| m.created_at);
    [since, newest, Some(committed)].into_iter().flatten().max().unwrap_or(committed)
}

/// GET /api/chat/poll?room_id=&since=
pub async fn handle_poll(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PollQuery>,
) -> Result<Json<PollResponse>, AppError> {
    let scope = ChatScope::for_user(&user)?;
    let room_id = require_room(query.room_id.as_deref())?;
    scope.require(&room_id)?;
    let since = match query.since.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            parse_datetime(raw).ok_or_else(|| AppError::InvalidInput(vec![FieldError::new("since", "Fecha inválida")]))?,
        ),
        None => None,
    };

    // Read before querying: everything stamped up to here is already visible.
    let committed = state.chat.committed_through().await;
    let messages = match since {
        Some(since) => repository::list_room_since(&state.db, &room_id, since).await?,
        None => repository::list_room(&state.db, &room_id).await?,
    };
    let timestamp = poll_cursor(since, &messages, committed);
    Ok(Json(PollResponse { messages, timestamp }))
}

/// GET /api/chat/status
pub async fn handle_online_users(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<OnlineUsersResponse>, AppError> {
    ChatScope::for_user(&user)?;
    Ok(Json(OnlineUsersResponse {
        online_users: state.chat.presence.online_users().await,
    }))
}

/// POST /api/chat/status
pub async fn handle_set_status(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<OnlineUsersResponse>, AppError> {
    ChatScope::for_user(&user)?;
    let presence = &state.chat.presence;
    let changed = match req.status {
        PresenceStatus::Online => {
            presence
                .set_online(OnlineUser {
                    user_id: user.id,
                    name: user.name.clone(),
                    role: user.role,
                    since: Utc::now(),
                })
                .await
        }
        PresenceStatus::Offline => presence.set_offline(user.id).await,
    };
    if changed {
        info!("Chat user {} is now {:?}", user.id, req.status);
        state.chat.broadcaster.publish(ChatEvent::UserStatusChanged {
            user_id: user.id,
            status: req.status,
        });
    }
    Ok(Json(OnlineUsersResponse {
        online_users: presence.online_users().await,
    }))
}

/// POST /api/chat/typing
pub async fn handle_set_typing(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<TypingRequest>,
) -> Result<StatusCode, AppError> {
    let scope = ChatScope::for_user(&user)?;
    let room_id = require_room(req.room_id.as_deref())?;
    scope.require(&room_id)?;
    state.chat.set_typing(room_id, user.id, user.name, req.is_typing).await;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/chat/typing?room_id=
pub async fn handle_list_typing(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<RoomQuery>,
) -> Result<Json<TypingResponse>, AppError> {
    let scope = ChatScope::for_user(&user)?;
    let room_id = require_room(query.room_id.as_deref())?;
    scope.require(&room_id)?;
    let typing_users = state.chat.presence.typists(&room_id).await;
    Ok(Json(TypingResponse { room_id, typing_users }))
}

/// GET /api/chat/events?room_id=
pub async fn handle_events(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<RoomQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let scope = ChatScope::for_user(&user)?;
    let room = query.room_id.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
    if let Some(room) = &room {
        scope.require(room)?;
    }
    info!(
        "Chat SSE client {} connected (room: {}), {} already subscribed",
        user.id,
        room.as_deref().unwrap_or("*"),
        state.chat.broadcaster.subscriber_count()
    );
    let heartbeat = Duration::from_secs(state.config.chat_heartbeat_secs.max(1));
    Ok(Sse::new(state.chat.broadcaster.sse_stream(user.id, room, scope, heartbeat)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use chrono::TimeZone;

    fn message_at(created_at: DateTime<Utc>) -> ChatMessage {
        ChatMessage {
            id: Uuid::new_v4(),
            room_id: "general".into(),
            sender_id: Uuid::new_v4(),
            sender_name: "Ana".into(),
            sender_role: Role::Recruiter,
            content: "hola".into(),
            message_type: MessageType::Text,
            reply_to: None,
            is_edited: false,
            edited_at: None,
            created_at,
        }
    }

    #[test]
    fn test_poll_cursor_never_passes_uncommitted_stamps() {
        let t = |s| Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, s).unwrap();
        // Nothing new: keep the committed watermark, not a later wall clock.
        assert_eq!(poll_cursor(Some(t(5)), &[], t(3)), t(5));
        assert_eq!(poll_cursor(None, &[], t(3)), t(3));
        // Returned messages move the cursor to the newest one.
        assert_eq!(poll_cursor(Some(t(1)), &[message_at(t(2)), message_at(t(8))], t(4)), t(8));
    }
}
