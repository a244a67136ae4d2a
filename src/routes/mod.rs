// Route module decomposition — each domain area in its own file.
// Shared types (request guards) live here; route functions in submodules.

mod commands;
mod metadata;
mod rooms;
mod stream;
mod system;

// --- Re-exports (all route functions used by lib.rs mount) ---

pub use commands::{
    assume_chair, next_participant, poll_cancel, poll_close, poll_end, poll_start, poll_vote,
    request_speak, room_destroy, set_limit, timer, update_config, withdraw,
};
pub use metadata::{decision_rules, deliverables, meeting_goals, participation_formats};
pub use rooms::{chair_redirect, create_room, get_room, join, room_redirect};
pub use stream::room_stream;
pub use system::{healthz, not_found};

// --- Shared request guards ---

use rocket::request::{FromRequest, Outcome, Request};

/// Derived from `X-Forwarded-For` or the peer address. Not used for
/// authorization — room codes and session ids are the only access control
/// this server has (spec.md §1 Non-goals: no participant authentication).
pub struct ClientIp(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientIp {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let ip = req
            .headers()
            .get_one("X-Forwarded-For")
            .and_then(|s| s.split(',').next())
            .map(|s| s.trim().to_string())
            .or_else(|| req.remote().map(|r| r.ip().to_string()))
            .unwrap_or_else(|| "unknown".to_string());
        Outcome::Success(ClientIp(ip))
    }
}
