use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::chat::ChatMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Offline,
}

/// Events pushed to chat subscribers. Serialized with a `type` discriminator.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Connected {
        user_id: Uuid,
    },
    NewMessage {
        message: ChatMessage,
    },
    MessageUpdated {
        message: ChatMessage,
    },
    MessageDeleted {
        message_id: Uuid,
        room_id: String,
    },
    UserStatusChanged {
        user_id: Uuid,
        status: PresenceStatus,
    },
    UserTyping {
        room_id: String,
        user_id: Uuid,
        user_name: String,
        is_typing: bool,
    },
    Heartbeat {
        timestamp: DateTime<Utc>,
    },
}

impl ChatEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ChatEvent::Connected { .. } => "connected",
            ChatEvent::NewMessage { .. } => "new_message",
            ChatEvent::MessageUpdated { .. } => "message_updated",
            ChatEvent::MessageDeleted { .. } => "message_deleted",
            ChatEvent::UserStatusChanged { .. } => "user_status_changed",
            ChatEvent::UserTyping { .. } => "user_typing",
            ChatEvent::Heartbeat { .. } => "heartbeat",
        }
    }

    /// Room the event belongs to; `None` for global events.
    pub fn room_id(&self) -> Option<&str> {
        match self {
            ChatEvent::NewMessage { message } | ChatEvent::MessageUpdated { message } => Some(&message.room_id),
            ChatEvent::MessageDeleted { room_id, .. } | ChatEvent::UserTyping { room_id, .. } => Some(room_id),
            _ => None,
        }
    }

    /// Global events reach every subscriber; room events only those watching that room or all rooms.
    pub fn visible_in(&self, room: Option<&str>) -> bool {
        match (room, self.room_id()) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_type_tag() {
        let event = ChatEvent::MessageDeleted {
            message_id: Uuid::nil(),
            room_id: "general".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "message_deleted");
        assert_eq!(json["room_id"], "general");

        let status = ChatEvent::UserStatusChanged {
            user_id: Uuid::nil(),
            status: PresenceStatus::Offline,
        };
        assert_eq!(serde_json::to_value(&status).unwrap()["status"], "offline");
    }

    #[test]
    fn test_room_filtering() {
        let typing = ChatEvent::UserTyping {
            room_id: "rrhh".into(),
            user_id: Uuid::nil(),
            user_name: "Ana".into(),
            is_typing: true,
        };
        assert!(typing.visible_in(None));
        assert!(typing.visible_in(Some("rrhh")));
        assert!(!typing.visible_in(Some("general")));

        let heartbeat = ChatEvent::Heartbeat { timestamp: Utc::now() };
        assert!(heartbeat.visible_in(Some("general")));
    }
}
