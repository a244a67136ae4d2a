//! The duplex channel's server-to-client half: one SSE connection per
//! session, multiplexing every topic from spec.md §6.2 by filtering the
//! shared `RoomEvent` broadcast by room code and/or session id. Mirrors the
//! teacher's `routes::stream::message_stream`, which filters `ChatEvent` by
//! `room_id` over the same kind of `tokio::sync::broadcast` channel.

use std::sync::Arc;

use rocket::response::stream::{Event, EventStream};
use rocket::{get, State};
use tokio::time::{interval, Duration};
use uuid::Uuid;

use crate::dispatch;
use crate::events::{EventBus, RoomEvent};
use crate::registry::RoomRegistry;
use crate::session::SessionGuard;
use crate::validation::normalize_room_code;

/// Binds `session_id` to `code` if it isn't already bound to some room,
/// then streams every event relevant to this session for as long as the
/// connection stays open. Dropping the returned guard on disconnect is
/// what runs the spec's disconnect handler (release chair, broadcast,
/// unbind) — see `session::SessionGuard`.
#[get("/rooms/<code>/stream?<session_id>")]
pub fn room_stream(
    registry: &State<Arc<RoomRegistry>>,
    events: &State<Arc<EventBus>>,
    code: &str,
    session_id: Uuid,
) -> EventStream![] {
    let mut rx = events.sender.subscribe();
    let code = normalize_room_code(code);

    if registry.room_of_session(session_id).is_none() {
        registry.bind_session(session_id, &code);
    }

    let initial = dispatch::resolve_room(registry, events, session_id, &code).map(|room| room.snapshot());

    let guard = SessionGuard {
        registry: registry.inner().clone(),
        events: events.inner().clone(),
        session_id,
    };

    EventStream! {
        // Keep the session guard alive for the stream's lifetime; dropping
        // it (client disconnect) runs the chair-release / unbind cleanup.
        let _guard = guard;

        if let Some(snapshot) = initial {
            yield Event::json(&snapshot).event("state");
        }

        let mut heartbeat = interval(Duration::from_secs(15));

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    match msg {
                        Ok(RoomEvent::StateChanged { code: ref c, ref snapshot }) if *c == code => {
                            yield Event::json(snapshot.as_ref()).event("state");
                        }
                        Ok(RoomEvent::RoomDestroyed { code: ref c, ref message, ref landing_url }) if *c == code => {
                            yield Event::json(&serde_json::json!({"message": message, "landingUrl": landing_url})).event("destroyed");
                        }
                        Ok(RoomEvent::ChairAssumed { session_id: sid, ref request_id, success, .. }) if sid == session_id => {
                            yield Event::json(&serde_json::json!({"requestId": request_id, "success": success})).event("chairAssumed");
                        }
                        Ok(RoomEvent::ValidationError { session_id: sid, ref message }) if sid == session_id => {
                            yield Event::json(&serde_json::json!({"message": message})).event("error");
                        }
                        Ok(RoomEvent::RoomNotFound { session_id: sid, ref code, ref landing_url }) if sid == session_id => {
                            yield Event::json(&serde_json::json!({"roomCode": code, "landingUrl": landing_url})).event("roomNotFound");
                        }
                        Ok(RoomEvent::ChairAccessDenied { session_id: sid, ref code }) if sid == session_id => {
                            yield Event::json(&serde_json::json!({"roomCode": code})).event("chairAccessDenied");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        _ => {} // different room/session, or lagged
                    }
                }
                _ = heartbeat.tick() => {
                    yield Event::json(&serde_json::json!({"time": chrono::Utc::now().to_rfc3339()})).event("heartbeat");
                }
            }
        }
    }
}
