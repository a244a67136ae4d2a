pub mod dispatch;
pub mod events;
pub mod metadata;
pub mod models;
pub mod registry;
pub mod room;
pub mod routes;
pub mod session;
pub mod validation;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use events::EventBus;
use registry::{RegistryConfig, RoomRegistry};
use rocket::fs::{FileServer, Options};
use rocket_cors::CorsOptions;

pub fn rocket() -> rocket::Rocket<rocket::Build> {
    build_rocket(RegistryConfig::from_env())
}

pub fn rocket_with_config(config: RegistryConfig) -> rocket::Rocket<rocket::Build> {
    build_rocket(config)
}

fn build_rocket(config: RegistryConfig) -> rocket::Rocket<rocket::Build> {
    let registry = Arc::new(RoomRegistry::new(config));
    let events = Arc::new(EventBus::new());

    let cors = CorsOptions::default().to_cors().expect("Failed to create CORS");

    let figment = rocket::Config::figment();

    // Static front-end is out of scope for this server, but the teacher's
    // FileServer-if-present pattern is kept so a front-end can be dropped
    // in without touching the binary.
    let static_dir: PathBuf = env::var("STATIC_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("frontend/dist"));

    let mut build = rocket::custom(figment)
        .manage(registry)
        .manage(events)
        .attach(cors)
        .register("/", rocket::catchers![routes::not_found])
        .mount(
            "/",
            rocket::routes![
                routes::create_room,
                routes::get_room,
                routes::chair_redirect,
                routes::room_redirect,
                routes::join,
                routes::room_stream,
                routes::request_speak,
                routes::withdraw,
                routes::next_participant,
                routes::timer,
                routes::set_limit,
                routes::assume_chair,
                routes::poll_start,
                routes::poll_vote,
                routes::poll_end,
                routes::poll_close,
                routes::poll_cancel,
                routes::update_config,
                routes::room_destroy,
                routes::meeting_goals,
                routes::participation_formats,
                routes::decision_rules,
                routes::deliverables,
                routes::healthz,
            ],
        );

    if static_dir.is_dir() {
        println!("📦 Serving frontend from: {}", static_dir.display());
        build = build.mount("/", FileServer::new(&static_dir, Options::Index));
    } else {
        println!("⚠️  Frontend directory not found: {} (API-only mode)", static_dir.display());
    }

    build
}
