//! Team chat: persisted messages, in-memory presence and an SSE event feed.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use uuid::Uuid;

pub mod access;
pub mod broadcaster;
pub mod events;
pub mod handlers;
pub mod presence;
pub mod repository;

use broadcaster::{ChatBroadcaster, EVENT_CAPACITY};
use events::ChatEvent;
use presence::Presence;
use repository::NewMessage;

use crate::models::chat::ChatMessage;

#[derive(Clone)]
pub struct ChatHub {
    pub broadcaster: ChatBroadcaster,
    pub presence: Arc<Presence>,
    /// Last `created_at` handed out. Held across the insert so messages
    /// commit in timestamp order.
    last_stamp: Arc<Mutex<DateTime<Utc>>>,
}

impl ChatHub {
    pub fn new() -> Self {
        Self {
            broadcaster: ChatBroadcaster::new(EVENT_CAPACITY),
            presence: Arc::new(Presence::default()),
            last_stamp: Arc::new(Mutex::new(Utc::now())),
        }
    }

    /// Stores and publishes a message. Timestamps are strictly increasing.
    pub async fn send_message(&self, db: &SqlitePool, new: NewMessage<'_>) -> Result<ChatMessage, sqlx::Error> {
        let message = {
            let mut last = self.last_stamp.lock().await;
            let stamp = Utc::now().max(*last + Duration::microseconds(1));
            let message = repository::insert_message(db, new, stamp).await?;
            *last = stamp;
            message
        };
        self.broadcaster.publish(ChatEvent::NewMessage { message: message.clone() });
        Ok(message)
    }

    /// Every message stamped at or before the returned instant is committed.
    pub async fn committed_through(&self) -> DateTime<Utc> {
        *self.last_stamp.lock().await
    }

    /// Records the flag and publishes it. A set flag that is not refreshed
    /// within the typing TTL is cleared and a stop event is published.
    pub async fn set_typing(&self, room_id: String, user_id: Uuid, user_name: String, is_typing: bool) {
        let deadline = self
            .presence
            .set_typing(&room_id, user_id, &user_name, is_typing)
            .await;
        self.broadcaster.publish(ChatEvent::UserTyping {
            room_id: room_id.clone(),
            user_id,
            user_name: user_name.clone(),
            is_typing,
        });

        if let Some(deadline) = deadline {
            let hub = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep_until(deadline).await;
                if hub.presence.expire_typing(&room_id, user_id, deadline).await {
                    hub.broadcaster.publish(ChatEvent::UserTyping {
                        room_id,
                        user_id,
                        user_name,
                        is_typing: false,
                    });
                }
            });
        }
    }
}

impl Default for ChatHub {
    fn default() -> Self {
        Self::new()
    }
}
