//! Fan-out of chat events to SSE subscribers.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::Event;
use chrono::Utc;
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant};
use tokio_stream::wrappers::{BroadcastStream, IntervalStream};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::chat::access::ChatScope;
use crate::chat::events::ChatEvent;

pub const EVENT_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct ChatBroadcaster {
    tx: broadcast::Sender<ChatEvent>,
}

impl ChatBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Sends to every connected subscriber; a send with nobody listening is not an error.
    pub fn publish(&self, event: ChatEvent) {
        if let Ok(count) = self.tx.send(event) {
            debug!("Published chat event to {count} subscribers");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// `connected` first, then room-filtered events interleaved with heartbeats.
    /// Events from rooms outside `scope` and events a lagging subscriber missed
    /// are skipped.
    pub fn events(
        &self,
        user_id: Uuid,
        room: Option<String>,
        scope: ChatScope,
        heartbeat: Duration,
    ) -> impl Stream<Item = ChatEvent> {
        let published = BroadcastStream::new(self.tx.subscribe()).filter_map(move |result| {
            let room = room.clone();
            async move {
                match result {
                    Ok(event)
                        if event.visible_in(room.as_deref())
                            && event.room_id().map_or(true, |r| scope.can_access(r)) =>
                    {
                        Some(event)
                    }
                    Ok(_) => None,
                    Err(e) => {
                        warn!("Chat subscriber {user_id} lagged: {e}");
                        None
                    }
                }
            }
        });
        let heartbeats = IntervalStream::new(interval_at(Instant::now() + heartbeat, heartbeat))
            .map(|_| ChatEvent::Heartbeat { timestamp: Utc::now() });

        stream::once(async move { ChatEvent::Connected { user_id } })
            .chain(stream::select(published, heartbeats))
    }

    pub fn sse_stream(
        &self,
        user_id: Uuid,
        room: Option<String>,
        scope: ChatScope,
        heartbeat: Duration,
    ) -> impl Stream<Item = Result<Event, Infallible>> {
        self.events(user_id, room, scope, heartbeat).filter_map(|event| async move {
            match Event::default().event(event.name()).json_data(&event) {
                Ok(sse) => Some(Ok(sse)),
                Err(e) => {
                    warn!("Failed to serialize chat event: {e}");
                    None
                }
            }
        })
    }
}
