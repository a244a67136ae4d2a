use rocket::get;
use rocket::serde::json::Json;

use crate::metadata::{self, MetadataResponse};

#[get("/metadata/meeting-goals")]
pub fn meeting_goals() -> Json<MetadataResponse> {
    Json(metadata::meeting_goals())
}

#[get("/metadata/participation-formats")]
pub fn participation_formats() -> Json<MetadataResponse> {
    Json(metadata::participation_formats())
}

#[get("/metadata/decision-rules")]
pub fn decision_rules() -> Json<MetadataResponse> {
    Json(metadata::decision_rules())
}

#[get("/metadata/deliverables")]
pub fn deliverables() -> Json<MetadataResponse> {
    Json(metadata::deliverables())
}
