#![forbid(unsafe_code)]
use quart::api::{handle, ApiReply};
use quart::{ShiftService, SqliteStore};
use serde_json::{json, Value};
use tiny_http::Method;

fn service() -> ShiftService<SqliteStore> {
    ShiftService::new(SqliteStore::open_in_memory().unwrap())
}

fn create_shift(s: &ShiftService<SqliteStore>, date: &str, start: &str, end: &str) -> Value {
    let body = json!({
        "name": "quart",
        "date": date,
        "startTime": start,
        "endTime": end,
    })
    .to_string();
    let reply = handle(s, &Method::Post, "/v1/shifts", &body);
    assert_eq!(reply.status_code, 200, "{}", reply.message);
    reply.results.unwrap()
}

fn results(reply: ApiReply) -> Value {
    assert_eq!(reply.status_code, 200, "{}", reply.message);
    reply.results.unwrap()
}

#[test]
fn create_returns_envelope_with_shift() {
    let s = service();
    let body = json!({
        "name": "matin",
        "date": "2024-03-04",
        "startTime": "09:00:00",
        "endTime": "17:00:00",
    })
    .to_string();
    let reply = handle(&s, &Method::Post, "/v1/shifts", &body);
    assert_eq!(reply.status_code, 200);
    assert_eq!(reply.message, "Create shift successful");
    let created = reply.results.unwrap();
    assert_eq!(created["name"], "matin");
    assert_eq!(created["isPublished"], Value::Bool(false));
    assert!(created["id"].as_str().is_some());
}

#[test]
fn overlapping_create_is_a_400_with_detail() {
    let s = service();
    create_shift(&s, "2024-03-04", "09:00:00", "17:00:00");
    let body = json!({
        "name": "soir",
        "date": "2024-03-04",
        "startTime": "16:00:00",
        "endTime": "18:00:00",
    })
    .to_string();
    let reply = handle(&s, &Method::Post, "/v1/shifts", &body);
    assert_eq!(reply.status_code, 400);
    assert!(reply.message.contains("already exists / overlapping"));
    assert!(reply.message.contains("2024-03-04"));
}

#[test]
fn list_honors_week_filter_and_envelope_shape() {
    let s = service();
    create_shift(&s, "2024-03-04", "09:00:00", "17:00:00");
    create_shift(&s, "2024-03-06", "09:00:00", "17:00:00");
    create_shift(&s, "2024-03-11", "09:00:00", "17:00:00");

    let reply = handle(&s, &Method::Get, "/v1/shifts?weekId=2024-03-06", "");
    assert_eq!(reply.message, "Get shift successful");
    let body = results(reply);
    assert_eq!(body["totalCount"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let reply = handle(&s, &Method::Get, "/v1/shifts?limit=1&offset=0", "");
    let body = results(reply);
    assert_eq!(body["totalCount"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[test]
fn get_by_id_roundtrip_and_miss() {
    let s = service();
    let created = create_shift(&s, "2024-03-04", "09:00:00", "17:00:00");
    let id = created["id"].as_str().unwrap();

    let reply = handle(&s, &Method::Get, &format!("/v1/shifts/{id}"), "");
    let fetched = results(reply);
    assert_eq!(fetched["id"], created["id"]);

    let reply = handle(&s, &Method::Get, "/v1/shifts/missing", "");
    assert_eq!(reply.status_code, 404);
    assert!(reply.message.contains("unknown shift"));
}

#[test]
fn patch_updates_subset_of_fields() {
    let s = service();
    let created = create_shift(&s, "2024-03-04", "09:00:00", "17:00:00");
    let id = created["id"].as_str().unwrap();

    let reply = handle(
        &s,
        &Method::Patch,
        &format!("/v1/shifts/{id}"),
        &json!({ "endTime": "18:00:00" }).to_string(),
    );
    assert_eq!(reply.message, "Update shift successful");
    let updated = results(reply);
    assert_eq!(updated["endTime"], "18:00:00");
    assert_eq!(updated["startTime"], "09:00:00");
}

#[test]
fn publish_route_then_republish_conflict() {
    let s = service();
    create_shift(&s, "2024-03-04", "09:00:00", "17:00:00");

    let body = json!({ "weekId": "2024-03-04" }).to_string();
    let reply = handle(&s, &Method::Post, "/v1/shifts/publish", &body);
    let published = results(reply);
    assert_eq!(published.as_array().unwrap().len(), 1);
    assert_eq!(published[0]["isPublished"], Value::Bool(true));

    let reply = handle(&s, &Method::Post, "/v1/shifts/publish", &body);
    assert_eq!(reply.status_code, 400);
    assert_eq!(reply.message, "this shift is already published");
}

#[test]
fn delete_route_guards_published_rows() {
    let s = service();
    let created = create_shift(&s, "2024-03-04", "09:00:00", "17:00:00");
    let id = created["id"].as_str().unwrap().to_string();

    let body = json!({ "weekId": "2024-03-04" }).to_string();
    handle(&s, &Method::Post, "/v1/shifts/publish", &body);

    let reply = handle(&s, &Method::Delete, &format!("/v1/shifts/{id}"), "");
    assert_eq!(reply.status_code, 400);
    assert_eq!(reply.message, "this shift is already published");
}

#[test]
fn delete_route_reports_count() {
    let s = service();
    let created = create_shift(&s, "2024-03-04", "09:00:00", "17:00:00");
    let id = created["id"].as_str().unwrap().to_string();

    let reply = handle(&s, &Method::Delete, &format!("/v1/shifts/{id}"), "");
    assert_eq!(reply.message, "Delete shift successful");
    let body = results(reply);
    assert_eq!(body["deleted"], 1);
}

#[test]
fn malformed_payload_and_query_are_400() {
    let s = service();
    let reply = handle(&s, &Method::Post, "/v1/shifts", "not json");
    assert_eq!(reply.status_code, 400);
    assert!(reply.message.starts_with("invalid payload"));

    let reply = handle(&s, &Method::Get, "/v1/shifts?weekId=nope", "");
    assert_eq!(reply.status_code, 400);
    assert!(reply.message.contains("invalid date"));

    let reply = handle(&s, &Method::Get, "/v1/shifts?bogus=1", "");
    assert_eq!(reply.status_code, 400);
    assert!(reply.message.contains("unknown query parameter"));
}

#[test]
fn unknown_route_is_404() {
    let s = service();
    let reply = handle(&s, &Method::Get, "/v1/people", "");
    assert_eq!(reply.status_code, 404);

    let reply = handle(&s, &Method::Put, "/v1/shifts", "");
    assert_eq!(reply.status_code, 404);
}
