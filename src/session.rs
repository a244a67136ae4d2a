//! RAII guard that performs the disconnect handler from spec.md §4.3: when
//! a session's SSE stream is dropped (client disconnects), release chair
//! if held and broadcast the room's state, then always unbind the session.
//! Mirrors the teacher's `PresenceGuard` (`routes::mod::PresenceGuard`),
//! which removes presence and publishes `PresenceLeft` on `Drop`.

use std::sync::Arc;
use uuid::Uuid;

use crate::dispatch::broadcast;
use crate::events::EventBus;
use crate::registry::RoomRegistry;

pub struct SessionGuard {
    pub registry: Arc<RoomRegistry>,
    pub events: Arc<EventBus>,
    pub session_id: Uuid,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(room) = self.registry.room_of_session(self.session_id) {
            if room.is_chair(self.session_id) {
                room.release_chair(self.session_id);
                broadcast(&self.registry, &self.events, &room.code);
            }
        }
        self.registry.unbind_session(self.session_id);
    }
}
