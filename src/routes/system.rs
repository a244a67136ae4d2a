use std::sync::Arc;

use rocket::serde::json::Json;
use rocket::{get, State};

use crate::registry::RoomRegistry;

#[get("/healthz")]
pub fn healthz(registry: &State<Arc<RoomRegistry>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "meetingd",
        "version": env!("CARGO_PKG_VERSION"),
        "activeRooms": registry.len(),
    }))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<serde_json::Value> {
    Json(serde_json::json!({"error": "ROOM_NOT_FOUND"}))
}
