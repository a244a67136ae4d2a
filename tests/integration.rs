use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;

use meetingd::registry::RegistryConfig;

fn test_client() -> Client {
    let rocket = meetingd::rocket_with_config(RegistryConfig::default());
    Client::tracked(rocket).expect("valid rocket instance")
}

fn create_room(client: &Client) -> String {
    let res = client.post("/rooms").dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: serde_json::Value = res.into_json().unwrap();
    body["roomCode"].as_str().unwrap().to_string()
}

fn join(client: &Client, code: &str, name: &str) -> uuid::Uuid {
    let res = client
        .post(format!("/rooms/{code}/join"))
        .header(ContentType::JSON)
        .body(format!(r#"{{"name": "{name}"}}"#))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: serde_json::Value = res.into_json().unwrap();
    body["sessionId"].as_str().unwrap().parse().unwrap()
}

fn assume_chair(client: &Client, code: &str) -> uuid::Uuid {
    let session_id = join(client, code, "someone");
    let res = client
        .post(format!("/rooms/{code}/assume-chair"))
        .header(ContentType::JSON)
        .body(format!(
            r#"{{"sessionId": "{session_id}", "participantName": "Chair", "requestId": "r1"}}"#
        ))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["success"], true);
    session_id
}

// --- Health ---

#[test]
fn test_healthz() {
    let client = test_client();
    let res = client.get("/healthz").dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "meetingd");
}

#[test]
fn test_healthz_counts_active_rooms() {
    let client = test_client();
    create_room(&client);
    create_room(&client);
    let body: serde_json::Value = client.get("/healthz").dispatch().into_json().unwrap();
    assert_eq!(body["activeRooms"], 2);
}

// --- Room lifecycle ---

#[test]
fn test_create_and_probe_room() {
    let client = test_client();
    let code = create_room(&client);
    assert_eq!(code.chars().count(), 4);

    let res = client.get(format!("/rooms/{code}")).dispatch();
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["exists"], true);

    let res = client.get("/rooms/ZZZZ").dispatch();
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["exists"], false);
}

#[test]
fn test_room_code_is_case_and_zero_normalized() {
    let client = test_client();
    let code = create_room(&client);
    let lower = code.to_lowercase().replace('O', "0");
    let res = client.get(format!("/rooms/{lower}")).dispatch();
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["exists"], true);
}

#[test]
fn test_join_unknown_room_is_not_found() {
    let client = test_client();
    let res = client
        .post("/rooms/ZZZZ/join")
        .header(ContentType::JSON)
        .body(r#"{"name": "alice"}"#)
        .dispatch();
    assert_eq!(res.status(), Status::NotFound);
}

#[test]
fn test_join_as_chair_reserved_name_assumes_chair() {
    let client = test_client();
    let code = create_room(&client);
    join(&client, &code, "Chair");

    // A second "Chair" join should not be granted the role again, but
    // must still succeed as an ordinary join (spec.md §4.3).
    let res = client
        .post(format!("/rooms/{code}/join"))
        .header(ContentType::JSON)
        .body(r#"{"name": "Chair"}"#)
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
}

// --- Chair authorization ---

#[test]
fn test_non_chair_cannot_advance_queue() {
    let client = test_client();
    let code = create_room(&client);
    let session_id = join(&client, &code, "bystander");

    let res = client
        .post(format!("/rooms/{code}/next"))
        .header(ContentType::JSON)
        .body(format!(r#"{{"sessionId": "{session_id}"}}"#))
        .dispatch();
    assert_eq!(res.status(), Status::Forbidden);
}

#[test]
fn test_chair_can_advance_queue() {
    let client = test_client();
    let code = create_room(&client);
    let chair = assume_chair(&client, &code);

    client
        .post(format!("/rooms/{code}/request"))
        .header(ContentType::JSON)
        .body(r#"{"name": "Alice"}"#)
        .dispatch();

    let res = client
        .post(format!("/rooms/{code}/next"))
        .header(ContentType::JSON)
        .body(format!(r#"{{"sessionId": "{chair}"}}"#))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
}

#[test]
fn test_second_assume_chair_request_fails_while_occupied() {
    let client = test_client();
    let code = create_room(&client);
    assume_chair(&client, &code);

    let other = join(&client, &code, "bob");
    let res = client
        .post(format!("/rooms/{code}/assume-chair"))
        .header(ContentType::JSON)
        .body(format!(
            r#"{{"sessionId": "{other}", "participantName": "Bob", "requestId": "r2"}}"#
        ))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["success"], false);
}

// --- Timer ---

#[test]
fn test_chair_only_timer_control() {
    let client = test_client();
    let code = create_room(&client);
    let chair = assume_chair(&client, &code);
    let stranger = join(&client, &code, "stranger");

    let res = client
        .post(format!("/rooms/{code}/timer"))
        .header(ContentType::JSON)
        .body(format!(r#"{{"sessionId": "{stranger}", "action": "pause"}}"#))
        .dispatch();
    assert_eq!(res.status(), Status::Forbidden);

    let res = client
        .post(format!("/rooms/{code}/timer"))
        .header(ContentType::JSON)
        .body(format!(r#"{{"sessionId": "{chair}", "action": "pause"}}"#))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
}

#[test]
fn test_set_limit_clamps_out_of_range_values() {
    let client = test_client();
    let code = create_room(&client);
    let chair = assume_chair(&client, &code);

    let res = client
        .post(format!("/rooms/{code}/limit"))
        .header(ContentType::JSON)
        .body(format!(r#"{{"sessionId": "{chair}", "seconds": 999999}}"#))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
}

// --- Validation ---

#[test]
fn test_request_with_blank_name_is_rejected() {
    let client = test_client();
    let code = create_room(&client);

    let res = client
        .post(format!("/rooms/{code}/request"))
        .header(ContentType::JSON)
        .body(r#"{"name": "   "}"#)
        .dispatch();
    assert_eq!(res.status(), Status::UnprocessableEntity);
}

#[test]
fn test_poll_question_too_long_is_rejected() {
    let client = test_client();
    let code = create_room(&client);
    let chair = assume_chair(&client, &code);
    let question = "x".repeat(500);

    let res = client
        .post(format!("/rooms/{code}/poll/start"))
        .header(ContentType::JSON)
        .body(format!(
            r#"{{"sessionId": "{chair}", "question": "{question}", "pollType": "YES_NO"}}"#
        ))
        .dispatch();
    assert_eq!(res.status(), Status::UnprocessableEntity);
}

// --- Polls ---

#[test]
fn test_poll_lifecycle_yes_no() {
    let client = test_client();
    let code = create_room(&client);
    let chair = assume_chair(&client, &code);
    let voter = join(&client, &code, "voter");

    let res = client
        .post(format!("/rooms/{code}/poll/start"))
        .header(ContentType::JSON)
        .body(format!(
            r#"{{"sessionId": "{chair}", "question": "Proceed?", "pollType": "YES_NO"}}"#
        ))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);

    let res = client
        .post(format!("/rooms/{code}/poll/vote"))
        .header(ContentType::JSON)
        .body(format!(r#"{{"sessionId": "{voter}", "vote": "YES"}}"#))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["accepted"], true);

    // Unknown vote key is rejected, not erroring.
    let res = client
        .post(format!("/rooms/{code}/poll/vote"))
        .header(ContentType::JSON)
        .body(format!(r#"{{"sessionId": "{voter}", "vote": "MAYBE"}}"#))
        .dispatch();
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["accepted"], false);

    let res = client
        .post(format!("/rooms/{code}/poll/end"))
        .header(ContentType::JSON)
        .body(format!(r#"{{"sessionId": "{chair}"}}"#))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);

    let res = client
        .post(format!("/rooms/{code}/poll/close"))
        .header(ContentType::JSON)
        .body(format!(r#"{{"sessionId": "{chair}"}}"#))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
}

#[test]
fn test_poll_vote_by_non_chair_is_allowed() {
    let client = test_client();
    let code = create_room(&client);
    let chair = assume_chair(&client, &code);
    let voter = join(&client, &code, "voter");

    client
        .post(format!("/rooms/{code}/poll/start"))
        .header(ContentType::JSON)
        .body(format!(
            r#"{{"sessionId": "{chair}", "question": "Q", "pollType": "YES_NO"}}"#
        ))
        .dispatch();

    let res = client
        .post(format!("/rooms/{code}/poll/vote"))
        .header(ContentType::JSON)
        .body(format!(r#"{{"sessionId": "{voter}", "vote": "NO"}}"#))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
}

// --- Config ---

#[test]
fn test_update_config_is_chair_only() {
    let client = test_client();
    let code = create_room(&client);
    let stranger = join(&client, &code, "stranger");

    let res = client
        .post(format!("/rooms/{code}/config"))
        .header(ContentType::JSON)
        .body(format!(
            r#"{{"sessionId": "{stranger}", "topic": "Budget"}}"#
        ))
        .dispatch();
    assert_eq!(res.status(), Status::Forbidden);
}

#[test]
fn test_update_config_accepts_unknown_enum_as_unset() {
    let client = test_client();
    let code = create_room(&client);
    let chair = assume_chair(&client, &code);

    let res = client
        .post(format!("/rooms/{code}/config"))
        .header(ContentType::JSON)
        .body(format!(
            r#"{{"sessionId": "{chair}", "meetingGoal": "NOT_A_REAL_GOAL"}}"#
        ))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
}

// --- Destroy ---

#[test]
fn test_destroy_is_chair_only_and_removes_room() {
    let client = test_client();
    let code = create_room(&client);
    let stranger = join(&client, &code, "stranger");

    let res = client
        .post(format!("/rooms/{code}/destroy"))
        .header(ContentType::JSON)
        .body(format!(r#"{{"sessionId": "{stranger}"}}"#))
        .dispatch();
    assert_eq!(res.status(), Status::Forbidden);

    let chair = assume_chair(&client, &code);
    let res = client
        .post(format!("/rooms/{code}/destroy"))
        .header(ContentType::JSON)
        .body(format!(r#"{{"sessionId": "{chair}"}}"#))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);

    let body: serde_json::Value = client.get(format!("/rooms/{code}")).dispatch().into_json().unwrap();
    assert_eq!(body["exists"], false);
}

// --- Registry capacity ---

#[test]
fn test_registry_evicts_oldest_room_at_capacity() {
    let rocket = meetingd::rocket_with_config(RegistryConfig { max_rooms: 1 });
    let client = Client::tracked(rocket).expect("valid rocket instance");
    let first = create_room(&client);
    let second = create_room(&client);

    let first_exists: serde_json::Value =
        client.get(format!("/rooms/{first}")).dispatch().into_json().unwrap();
    assert_eq!(first_exists["exists"], false);

    let second_exists: serde_json::Value =
        client.get(format!("/rooms/{second}")).dispatch().into_json().unwrap();
    assert_eq!(second_exists["exists"], true);
}

// --- Metadata ---

#[test]
fn test_metadata_endpoints_return_versioned_lists() {
    let client = test_client();
    for path in [
        "/metadata/meeting-goals",
        "/metadata/participation-formats",
        "/metadata/decision-rules",
        "/metadata/deliverables",
    ] {
        let res = client.get(path).dispatch();
        assert_eq!(res.status(), Status::Ok);
        let body: serde_json::Value = res.into_json().unwrap();
        assert_eq!(body["version"], "1.0");
        assert!(!body["data"].as_array().unwrap().is_empty());
    }
}
