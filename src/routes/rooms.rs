use std::sync::Arc;

use rocket::http::Status;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::{get, post, State};
use uuid::Uuid;

use crate::dispatch::{broadcast, validation_error};
use crate::events::EventBus;
use crate::models::JoinCommand;
use crate::registry::RoomRegistry;
use crate::validation::{normalize_room_code, validate_name};

/// `POST /rooms` — creates a fresh room. Rooms are never created as a
/// side effect of joining, queueing, or polling (spec.md §3 "Lifecycle").
#[post("/rooms")]
pub fn create_room(
    registry: &State<Arc<RoomRegistry>>,
) -> Result<Json<serde_json::Value>, (Status, Json<serde_json::Value>)> {
    let code = registry.generate_code().map_err(|e| {
        (
            Status::ServiceUnavailable,
            Json(serde_json::json!({"error": e.to_string()})),
        )
    })?;
    registry.create(&code);
    println!("🪑 Room {code} created");
    Ok(Json(serde_json::json!({
        "roomCode": code,
        "exists": true,
    })))
}

/// `GET /rooms/{code}` — pure existence probe; never creates.
#[get("/rooms/<code>")]
pub fn get_room(registry: &State<Arc<RoomRegistry>>, code: &str) -> Json<serde_json::Value> {
    let normalized = normalize_room_code(code);
    let exists = registry.find(&normalized).is_some();
    Json(serde_json::json!({
        "roomCode": normalized,
        "exists": exists,
    }))
}

#[get("/chair/<code>")]
pub fn chair_redirect(code: &str) -> Redirect {
    Redirect::to(format!("/chair.html?room={}", normalize_room_code(code)))
}

#[get("/room/<code>")]
pub fn room_redirect(code: &str) -> Redirect {
    Redirect::to(format!("/participant.html?room={}", normalize_room_code(code)))
}

/// The first message a client sends for a room: mints a session id, binds
/// it to the room, and auto-assumes chair for the reserved name `Chair`
/// (a no-op if chair is already held — spec.md §4.3).
#[post("/rooms/<code>/join", format = "json", data = "<body>")]
pub fn join(
    registry: &State<Arc<RoomRegistry>>,
    events: &State<Arc<EventBus>>,
    code: &str,
    body: Json<JoinCommand>,
) -> Result<Json<serde_json::Value>, (Status, Json<serde_json::Value>)> {
    let session_id = Uuid::new_v4();
    let name = validate_name(&body.name).map_err(|e| {
        validation_error(events, session_id, e.clone());
        (
            Status::UnprocessableEntity,
            Json(serde_json::json!({"error": "VALIDATION_ERROR", "message": e})),
        )
    })?;

    let normalized = normalize_room_code(code);
    let room = registry.find_or_fail(&normalized).map_err(|_| {
        (
            Status::NotFound,
            Json(serde_json::json!({"error": "ROOM_NOT_FOUND", "roomCode": normalized})),
        )
    })?;

    registry.bind_session(session_id, &normalized);

    if name == "Chair" && room.assume_chair(session_id).is_ok() {
        broadcast(registry, events, &normalized);
    }

    Ok(Json(serde_json::json!({
        "sessionId": session_id,
        "roomCode": normalized,
    })))
}
