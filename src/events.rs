use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::Snapshot;

/// The topics described in spec.md §6.2, all multiplexed over a single
/// broadcast bus and filtered per room/session at the subscriber, the
/// way the teacher filters `ChatEvent` per `room_id` in
/// `routes::stream::message_stream`.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    /// `room/{code}/state` — published to everyone in the room.
    StateChanged { code: String, snapshot: Box<Snapshot> },
    /// `chairAssumed` — targeted reply to the requesting session.
    ChairAssumed { code: String, session_id: Uuid, request_id: String, success: bool },
    /// `destroyed` — broadcast to the room.
    RoomDestroyed { code: String, message: String, landing_url: String },
    /// Per-session targeted error channel.
    ValidationError { session_id: Uuid, message: String },
    RoomNotFound { session_id: Uuid, code: String, landing_url: String },
    ChairAccessDenied { session_id: Uuid, code: String },
}

pub struct EventBus {
    pub sender: broadcast::Sender<RoomEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1024);
        EventBus { sender }
    }

    pub fn publish(&self, event: RoomEvent) {
        // Ignore send errors (no subscribers).
        let _ = self.sender.send(event);
    }
}
