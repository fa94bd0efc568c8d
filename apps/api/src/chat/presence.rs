//! In-memory online/typing state. Lost on restart.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use crate::models::user::Role;

pub const TYPING_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Serialize)]
pub struct OnlineUser {
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
    pub since: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Typist {
    pub user_id: Uuid,
    pub user_name: String,
}

struct TypingEntry {
    user_name: String,
    expires_at: Instant,
}

#[derive(Default)]
pub struct Presence {
    online: RwLock<HashMap<Uuid, OnlineUser>>,
    typing: RwLock<HashMap<(String, Uuid), TypingEntry>>,
}

impl Presence {
    /// Returns whether the user was not already online.
    pub async fn set_online(&self, user: OnlineUser) -> bool {
        self.online.write().await.insert(user.user_id, user).is_none()
    }

    /// Returns whether the user was online. Clears their typing flags too.
    pub async fn set_offline(&self, user_id: Uuid) -> bool {
        self.typing.write().await.retain(|(_, id), _| *id != user_id);
        self.online.write().await.remove(&user_id).is_some()
    }

    pub async fn online_users(&self) -> Vec<OnlineUser> {
        let mut users: Vec<OnlineUser> = self.online.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.since.cmp(&b.since));
        users
    }

    /// Setting refreshes the expiry and returns the new deadline; clearing
    /// removes the flag immediately.
    pub async fn set_typing(&self, room_id: &str, user_id: Uuid, user_name: &str, is_typing: bool) -> Option<Instant> {
        let mut typing = self.typing.write().await;
        let key = (room_id.to_string(), user_id);
        if !is_typing {
            typing.remove(&key);
            return None;
        }
        let expires_at = Instant::now() + TYPING_TTL;
        typing.insert(
            key,
            TypingEntry {
                user_name: user_name.to_string(),
                expires_at,
            },
        );
        Some(expires_at)
    }

    /// Drops the flag if it still carries `deadline`. A refreshed flag is kept.
    pub async fn expire_typing(&self, room_id: &str, user_id: Uuid, deadline: Instant) -> bool {
        let mut typing = self.typing.write().await;
        let key = (room_id.to_string(), user_id);
        match typing.get(&key) {
            Some(entry) if entry.expires_at == deadline => {
                typing.remove(&key);
                true
            }
            _ => false,
        }
    }

    /// Typists in a room whose flag has not expired.
    pub async fn typists(&self, room_id: &str) -> Vec<Typist> {
        let now = Instant::now();
        let mut typists: Vec<Typist> = self
            .typing
            .read()
            .await
            .iter()
            .filter(|((room, _), entry)| room == room_id && entry.expires_at > now)
            .map(|((_, user_id), entry)| Typist {
                user_id: *user_id,
                user_name: entry.user_name.clone(),
            })
            .collect();
        typists.sort_by(|a, b| a.user_name.cmp(&b.user_name));
        typists
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn online(name: &str) -> OnlineUser {
        OnlineUser {
            user_id: Uuid::new_v4(),
            name: name.into(),
            role: Role::Recruiter,
            since: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_online_offline() {
        let presence = Presence::default();
        let ana = online("Ana");
        assert!(presence.set_online(ana.clone()).await);
        assert!(!presence.set_online(ana.clone()).await);
        assert_eq!(presence.online_users().await.len(), 1);

        assert!(presence.set_offline(ana.user_id).await);
        assert!(!presence.set_offline(ana.user_id).await);
        assert!(presence.online_users().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_expires_unless_refreshed() {
        let presence = Presence::default();
        let (ana, luis) = (Uuid::new_v4(), Uuid::new_v4());
        presence.set_typing("general", ana, "Ana", true).await;
        presence.set_typing("general", luis, "Luis", true).await;
        presence.set_typing("rrhh", luis, "Luis", true).await;
        assert_eq!(presence.typists("general").await.len(), 2);

        tokio::time::advance(Duration::from_secs(2)).await;
        presence.set_typing("general", ana, "Ana", true).await;
        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(
            presence.typists("general").await,
            vec![Typist { user_id: ana, user_name: "Ana".into() }]
        );
        assert!(presence.typists("rrhh").await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_keeps_refreshed_flag() {
        let presence = Presence::default();
        let ana = Uuid::new_v4();
        let first = presence.set_typing("general", ana, "Ana", true).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        let second = presence.set_typing("general", ana, "Ana", true).await.unwrap();

        assert!(!presence.expire_typing("general", ana, first).await);
        assert_eq!(presence.typists("general").await.len(), 1);
        assert!(presence.expire_typing("general", ana, second).await);
        assert!(presence.set_typing("general", ana, "Ana", false).await.is_none());
    }

    #[tokio::test]
    async fn test_going_offline_clears_typing() {
        let presence = Presence::default();
        let ana = online("Ana");
        presence.set_online(ana.clone()).await;
        presence.set_typing("general", ana.user_id, "Ana", true).await;
        presence.set_offline(ana.user_id).await;
        assert!(presence.typists("general").await.is_empty());
    }
}
