use std::sync::Arc;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{post, State};
use uuid::Uuid;

use crate::dispatch::{broadcast, finish_assume_chair, finish_chair_result, resolve_room, validation_error};
use crate::events::EventBus;
use crate::models::{
    AssumeChairCommand, ChairOnlyCommand, NameCommand, PollStartCommand, PollVoteCommand,
    SetLimitCommand, TimerAction, TimerCommand, UpdateConfigCommand,
};
use crate::registry::RoomRegistry;
use crate::room::build_poll_type;
use crate::validation;

type ApiError = (Status, Json<serde_json::Value>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (Status::UnprocessableEntity, Json(serde_json::json!({"error": "VALIDATION_ERROR", "message": message.into()})))
}

fn ok() -> Json<serde_json::Value> {
    Json(serde_json::json!({"ok": true}))
}

/// `assumeChair` always replies on the `chairAssumed` topic regardless of
/// outcome (spec.md §4.3/§6.2) and binds the session if not already bound.
#[post("/rooms/<code>/assume-chair", format = "json", data = "<body>")]
pub fn assume_chair(
    registry: &State<Arc<RoomRegistry>>,
    events: &State<Arc<EventBus>>,
    code: &str,
    body: Json<AssumeChairCommand>,
) -> Result<Json<serde_json::Value>, ApiError> {
    validation::validate_name(&body.participant_name).map_err(|e| {
        validation_error(events, body.session_id, e.clone());
        bad_request(e)
    })?;
    let normalized = validation::normalize_room_code(code);
    let Some(room) = resolve_room(registry, events, body.session_id, &normalized) else {
        return Err((Status::NotFound, Json(serde_json::json!({"error": "ROOM_NOT_FOUND", "roomCode": normalized}))));
    };
    registry.bind_session(body.session_id, &normalized);
    let result = room.assume_chair(body.session_id);
    let success = result.is_ok();
    finish_assume_chair(registry, events, &normalized, body.session_id, body.request_id.clone(), result);
    Ok(Json(serde_json::json!({"success": success, "requestId": body.request_id})))
}

#[post("/rooms/<code>/request", format = "json", data = "<body>")]
pub fn request_speak(
    registry: &State<Arc<RoomRegistry>>,
    events: &State<Arc<EventBus>>,
    code: &str,
    body: Json<NameCommand>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session_id = body.session_id.unwrap_or_else(Uuid::new_v4);
    let name = validation::validate_name(&body.name).map_err(|e| {
        validation_error(events, session_id, e.clone());
        bad_request(e)
    })?;
    let normalized = validation::normalize_room_code(code);
    let Some(room) = resolve_room(registry, events, session_id, &normalized) else {
        return Err((Status::NotFound, Json(serde_json::json!({"error": "ROOM_NOT_FOUND", "roomCode": normalized}))));
    };
    room.add_to_queue(&name);
    broadcast(registry, events, &normalized);
    Ok(ok())
}

#[post("/rooms/<code>/withdraw", format = "json", data = "<body>")]
pub fn withdraw(
    registry: &State<Arc<RoomRegistry>>,
    events: &State<Arc<EventBus>>,
    code: &str,
    body: Json<NameCommand>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session_id = body.session_id.unwrap_or_else(Uuid::new_v4);
    let name = validation::validate_name(&body.name).map_err(|e| {
        validation_error(events, session_id, e.clone());
        bad_request(e)
    })?;
    let normalized = validation::normalize_room_code(code);
    let Some(room) = resolve_room(registry, events, session_id, &normalized) else {
        return Err((Status::NotFound, Json(serde_json::json!({"error": "ROOM_NOT_FOUND", "roomCode": normalized}))));
    };
    room.withdraw(&name);
    broadcast(registry, events, &normalized);
    Ok(ok())
}

#[post("/rooms/<code>/next", format = "json", data = "<body>")]
pub fn next_participant(
    registry: &State<Arc<RoomRegistry>>,
    events: &State<Arc<EventBus>>,
    code: &str,
    body: Json<ChairOnlyCommand>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let normalized = validation::normalize_room_code(code);
    let Some(room) = resolve_room(registry, events, body.session_id, &normalized) else {
        return Err((Status::NotFound, Json(serde_json::json!({"error": "ROOM_NOT_FOUND", "roomCode": normalized}))));
    };
    let result = room.next_participant(body.session_id);
    let denied = result.is_err();
    finish_chair_result(registry, events, &normalized, result);
    if denied {
        return Err((Status::Forbidden, Json(serde_json::json!({"error": "CHAIR_ACCESS_DENIED"}))));
    }
    Ok(ok())
}

#[post("/rooms/<code>/timer", format = "json", data = "<body>")]
pub fn timer(
    registry: &State<Arc<RoomRegistry>>,
    events: &State<Arc<EventBus>>,
    code: &str,
    body: Json<TimerCommand>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let normalized = validation::normalize_room_code(code);
    let Some(room) = resolve_room(registry, events, body.session_id, &normalized) else {
        return Err((Status::NotFound, Json(serde_json::json!({"error": "ROOM_NOT_FOUND", "roomCode": normalized}))));
    };
    let result = match body.action {
        TimerAction::Start => room.start_timer(body.session_id),
        TimerAction::Pause => room.pause_timer(body.session_id),
        TimerAction::Reset => room.reset_timer(body.session_id),
    };
    let denied = result.is_err();
    finish_chair_result(registry, events, &normalized, result);
    if denied {
        return Err((Status::Forbidden, Json(serde_json::json!({"error": "CHAIR_ACCESS_DENIED"}))));
    }
    Ok(ok())
}

#[post("/rooms/<code>/limit", format = "json", data = "<body>")]
pub fn set_limit(
    registry: &State<Arc<RoomRegistry>>,
    events: &State<Arc<EventBus>>,
    code: &str,
    body: Json<SetLimitCommand>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let normalized = validation::normalize_room_code(code);
    let Some(room) = resolve_room(registry, events, body.session_id, &normalized) else {
        return Err((Status::NotFound, Json(serde_json::json!({"error": "ROOM_NOT_FOUND", "roomCode": normalized}))));
    };
    let result = room.update_limit(body.session_id, body.seconds);
    let denied = result.is_err();
    finish_chair_result(registry, events, &normalized, result);
    if denied {
        return Err((Status::Forbidden, Json(serde_json::json!({"error": "CHAIR_ACCESS_DENIED"}))));
    }
    Ok(ok())
}

#[post("/rooms/<code>/poll/start", format = "json", data = "<body>")]
pub fn poll_start(
    registry: &State<Arc<RoomRegistry>>,
    events: &State<Arc<EventBus>>,
    code: &str,
    body: Json<PollStartCommand>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let question = validation::validate_question(&body.question).map_err(|e| {
        validation_error(events, body.session_id, e.clone());
        bad_request(e)
    })?;
    let normalized = validation::normalize_room_code(code);
    let Some(room) = resolve_room(registry, events, body.session_id, &normalized) else {
        return Err((Status::NotFound, Json(serde_json::json!({"error": "ROOM_NOT_FOUND", "roomCode": normalized}))));
    };
    let poll_type = build_poll_type(body.poll_type, body.options.clone(), body.votes_per_participant);
    let result = room.start_poll(body.session_id, question, poll_type);
    let denied = result.is_err();
    finish_chair_result(registry, events, &normalized, result);
    if denied {
        return Err((Status::Forbidden, Json(serde_json::json!({"error": "CHAIR_ACCESS_DENIED"}))));
    }
    Ok(ok())
}

/// Open to anyone, accepted only while the poll is `ACTIVE`; unknown keys
/// or over-cap selections are rejected silently (spec.md §4.2).
#[post("/rooms/<code>/poll/vote", format = "json", data = "<body>")]
pub fn poll_vote(
    registry: &State<Arc<RoomRegistry>>,
    events: &State<Arc<EventBus>>,
    code: &str,
    body: Json<PollVoteCommand>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let normalized = validation::normalize_room_code(code);
    let Some(room) = resolve_room(registry, events, body.session_id, &normalized) else {
        return Err((Status::NotFound, Json(serde_json::json!({"error": "ROOM_NOT_FOUND", "roomCode": normalized}))));
    };
    let accepted = room.cast_vote(body.session_id, &body.vote);
    broadcast(registry, events, &normalized);
    Ok(Json(serde_json::json!({"accepted": accepted})))
}

#[post("/rooms/<code>/poll/end", format = "json", data = "<body>")]
pub fn poll_end(
    registry: &State<Arc<RoomRegistry>>,
    events: &State<Arc<EventBus>>,
    code: &str,
    body: Json<ChairOnlyCommand>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let normalized = validation::normalize_room_code(code);
    let Some(room) = resolve_room(registry, events, body.session_id, &normalized) else {
        return Err((Status::NotFound, Json(serde_json::json!({"error": "ROOM_NOT_FOUND", "roomCode": normalized}))));
    };
    let result = room.end_poll(body.session_id);
    let denied = result.is_err();
    finish_chair_result(registry, events, &normalized, result);
    if denied {
        return Err((Status::Forbidden, Json(serde_json::json!({"error": "CHAIR_ACCESS_DENIED"}))));
    }
    Ok(ok())
}

#[post("/rooms/<code>/poll/close", format = "json", data = "<body>")]
pub fn poll_close(
    registry: &State<Arc<RoomRegistry>>,
    events: &State<Arc<EventBus>>,
    code: &str,
    body: Json<ChairOnlyCommand>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let normalized = validation::normalize_room_code(code);
    let Some(room) = resolve_room(registry, events, body.session_id, &normalized) else {
        return Err((Status::NotFound, Json(serde_json::json!({"error": "ROOM_NOT_FOUND", "roomCode": normalized}))));
    };
    let result = room.close_poll(body.session_id);
    let denied = result.is_err();
    finish_chair_result(registry, events, &normalized, result);
    if denied {
        return Err((Status::Forbidden, Json(serde_json::json!({"error": "CHAIR_ACCESS_DENIED"}))));
    }
    Ok(ok())
}

#[post("/rooms/<code>/poll/cancel", format = "json", data = "<body>")]
pub fn poll_cancel(
    registry: &State<Arc<RoomRegistry>>,
    events: &State<Arc<EventBus>>,
    code: &str,
    body: Json<ChairOnlyCommand>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let normalized = validation::normalize_room_code(code);
    let Some(room) = resolve_room(registry, events, body.session_id, &normalized) else {
        return Err((Status::NotFound, Json(serde_json::json!({"error": "ROOM_NOT_FOUND", "roomCode": normalized}))));
    };
    let result = room.cancel_poll(body.session_id);
    let denied = result.is_err();
    finish_chair_result(registry, events, &normalized, result);
    if denied {
        return Err((Status::Forbidden, Json(serde_json::json!({"error": "CHAIR_ACCESS_DENIED"}))));
    }
    Ok(ok())
}

#[post("/rooms/<code>/config", format = "json", data = "<body>")]
pub fn update_config(
    registry: &State<Arc<RoomRegistry>>,
    events: &State<Arc<EventBus>>,
    code: &str,
    body: Json<UpdateConfigCommand>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if let Some(topic) = &body.topic {
        validation::validate_config_string(topic).map_err(|e| {
            validation_error(events, body.session_id, e.clone());
            bad_request(e)
        })?;
    }
    let normalized = validation::normalize_room_code(code);
    let Some(room) = resolve_room(registry, events, body.session_id, &normalized) else {
        return Err((Status::NotFound, Json(serde_json::json!({"error": "ROOM_NOT_FOUND", "roomCode": normalized}))));
    };
    let result = room.update_config(
        body.session_id,
        body.topic.clone(),
        body.meeting_goal.clone(),
        body.participation_format.clone(),
        body.decision_rule.clone(),
        body.deliverable.clone(),
    );
    let denied = result.is_err();
    finish_chair_result(registry, events, &normalized, result);
    if denied {
        return Err((Status::Forbidden, Json(serde_json::json!({"error": "CHAIR_ACCESS_DENIED"}))));
    }
    Ok(ok())
}

/// Chair-only. Publishes the room-destroyed notice, unbinds every session,
/// and removes the room from the registry (spec.md §4.3 "destroy").
#[post("/rooms/<code>/destroy", format = "json", data = "<body>")]
pub fn room_destroy(
    registry: &State<Arc<RoomRegistry>>,
    events: &State<Arc<EventBus>>,
    code: &str,
    body: Json<ChairOnlyCommand>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let normalized = validation::normalize_room_code(code);
    let Some(room) = resolve_room(registry, events, body.session_id, &normalized) else {
        return Err((Status::NotFound, Json(serde_json::json!({"error": "ROOM_NOT_FOUND", "roomCode": normalized}))));
    };
    if !room.is_chair(body.session_id) {
        events.publish(crate::events::RoomEvent::ChairAccessDenied {
            session_id: body.session_id,
            code: normalized.clone(),
        });
        return Err((Status::Forbidden, Json(serde_json::json!({"error": "CHAIR_ACCESS_DENIED"}))));
    }

    events.publish(crate::events::RoomEvent::RoomDestroyed {
        code: normalized.clone(),
        message: "This meeting room was closed by the chair.".to_string(),
        landing_url: "/landing.html".to_string(),
    });
    for session in registry.sessions_of(&normalized) {
        registry.unbind_session(session);
    }
    registry.destroy(&normalized);
    println!("🗑️  Room {normalized} destroyed by chair");
    Ok(ok())
}
