//! The command-validation / authorization / broadcast loop tying incoming
//! commands to snapshot delivery (spec.md §4.3). Route handlers are thin:
//! they deserialize a command body, then hand off to the helpers here,
//! which do the normalize → resolve → apply → broadcast dance uniformly.

use std::sync::Arc;
use uuid::Uuid;

use crate::events::{EventBus, RoomEvent};
use crate::registry::RoomRegistry;
use crate::room::{Room, RoomError};
use crate::validation;

const LANDING_URL: &str = "/landing.html";

/// Produces a fresh snapshot for `code` and publishes it, or — if the room
/// vanished between the command completing and the broadcast (the
/// eviction race noted in spec.md §4.4/§9) — publishes a destroyed notice
/// instead.
pub fn broadcast(registry: &RoomRegistry, events: &EventBus, code: &str) {
    match registry.find(code) {
        Some(room) => {
            let snapshot = room.snapshot();
            events.publish(RoomEvent::StateChanged {
                code: code.to_string(),
                snapshot: Box::new(snapshot),
            });
        }
        None => {
            events.publish(RoomEvent::RoomDestroyed {
                code: code.to_string(),
                message: "This meeting room no longer exists.".to_string(),
                landing_url: LANDING_URL.to_string(),
            });
        }
    }
}

/// Normalizes `raw_code` and resolves it to a room, publishing a targeted
/// `ROOM_NOT_FOUND` event when absent. A command addressed to an unknown
/// code never creates a room (spec.md §3 "Lifecycle").
pub fn resolve_room(
    registry: &RoomRegistry,
    events: &EventBus,
    session_id: Uuid,
    raw_code: &str,
) -> Option<Arc<Room>> {
    let code = validation::normalize_room_code(raw_code);
    match registry.find_or_fail(&code) {
        Ok(room) => Some(room),
        Err(_) => {
            events.publish(RoomEvent::RoomNotFound {
                session_id,
                code,
                landing_url: LANDING_URL.to_string(),
            });
            None
        }
    }
}

/// Applies the result of a chair-only Room operation: broadcasts on
/// success, emits a targeted `CHAIR_ACCESS_DENIED` on denial. `ChairOccupied`
/// never occurs for chair-only operations (only `assumeChair` returns it,
/// which uses `finish_assume_chair` instead).
pub fn finish_chair_result(
    registry: &RoomRegistry,
    events: &EventBus,
    code: &str,
    result: Result<(), RoomError>,
) {
    match result {
        Ok(()) => broadcast(registry, events, code),
        Err(RoomError::ChairAccessDenied { session_id }) => {
            events.publish(RoomEvent::ChairAccessDenied {
                session_id,
                code: code.to_string(),
            });
        }
        Err(RoomError::ChairOccupied) => {}
    }
}

/// `assumeChair` always replies on the `chairAssumed` topic regardless of
/// outcome, and always follows with a fresh state broadcast so UIs
/// reconcile even after a `CHAIR_OCCUPIED` failure (spec.md §7).
pub fn finish_assume_chair(
    registry: &RoomRegistry,
    events: &EventBus,
    code: &str,
    session_id: Uuid,
    request_id: String,
    result: Result<(), RoomError>,
) {
    let success = result.is_ok();
    events.publish(RoomEvent::ChairAssumed {
        code: code.to_string(),
        session_id,
        request_id,
        success,
    });
    broadcast(registry, events, code);
}

/// Publishes a targeted `VALIDATION_ERROR` for the offending session.
pub fn validation_error(events: &EventBus, session_id: Uuid, message: String) {
    events.publish(RoomEvent::ValidationError { session_id, message });
}
