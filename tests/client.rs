//! HTTP-level tests for the calendar client, run against a mock server.

use chrono::{Duration, TimeZone, Utc};
use gcal_cli::client::CalendarClient;
use gcal_cli::session::{Session, SessionData};
use gcal_core::{AclRole, CalendarError, EventDraft, EventPatch};
use serde_json::json;
use wiremock::matchers::{
    body_partial_json, header, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> CalendarClient {
    let data = SessionData {
        access_token: "test-token".to_string(),
        refresh_token: "unused".to_string(),
        expires_at: Utc::now() + Duration::hours(1),
    };
    CalendarClient::new(Session::new(data), "primary").with_base_url(server.uri())
}

fn event_json(id: &str, summary: &str) -> serde_json::Value {
    json!({
        "id": id,
        "summary": summary,
        "start": { "dateTime": "2030-01-01T09:00:00Z" },
        "end": { "dateTime": "2030-01-01T10:00:00Z" },
    })
}

// --- not-found mapping ---

#[tokio::test]
async fn get_unknown_event_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server).get_by_id("missing").await.unwrap_err();
    assert!(matches!(err, CalendarError::NotFound(_)));
}

#[tokio::test]
async fn delete_unknown_event_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/calendars/primary/events/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/calendars/primary/events/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.delete("missing").await.unwrap_err().is_not_found());
    assert!(client.delete("gone").await.unwrap_err().is_not_found());
}

// --- create ---

#[tokio::test]
async fn create_expands_the_draft_and_survives_a_readback() {
    let server = MockServer::start().await;

    // The insert body must carry the expanded draft: attendee records built
    // from bare emails, RRULE lines from the keyword, and UTC wall times.
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "summary": "Standup",
            "description": "Morning sync",
            "attendees": [{ "email": "a@example.com" }, { "email": "b@example.com" }],
            "recurrence": ["RRULE:FREQ=DAILY;COUNT=2"],
            "start": { "dateTime": "2030-01-01T09:00:00Z", "timeZone": "UTC" },
            "end": { "dateTime": "2030-01-01T10:00:00Z", "timeZone": "UTC" },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "srv1",
            "summary": "Standup",
            "description": "Morning sync",
            "start": { "dateTime": "2030-01-01T09:00:00Z", "timeZone": "UTC" },
            "end": { "dateTime": "2030-01-01T10:00:00Z", "timeZone": "UTC" },
            "attendees": [{ "email": "a@example.com" }, { "email": "b@example.com" }],
            "recurrence": ["RRULE:FREQ=DAILY;COUNT=2"],
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events/srv1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "srv1",
            "summary": "Standup",
            "description": "Morning sync",
            "start": { "dateTime": "2030-01-01T09:00:00Z", "timeZone": "UTC" },
            "end": { "dateTime": "2030-01-01T10:00:00Z", "timeZone": "UTC" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let draft = EventDraft {
        summary: "Standup".to_string(),
        description: "Morning sync".to_string(),
        start: Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap(),
        attendee_emails: vec!["a@example.com".to_string(), "b@example.com".to_string()],
        recurrence: Some("daily".to_string()),
    };

    let client = client_for(&server);
    let created = client.create(draft).await.unwrap();
    assert_eq!(created.id_str(), "srv1");

    // A follow-up fetch of the assigned id yields the same core fields.
    let fetched = client.get_by_id("srv1").await.unwrap();
    assert_eq!(fetched.summary.as_deref(), Some("Standup"));
    assert_eq!(fetched.description.as_deref(), Some("Morning sync"));
    assert_eq!(
        fetched.start.as_ref().unwrap().date_time,
        created.start.as_ref().unwrap().date_time
    );
    assert_eq!(
        fetched.end.as_ref().unwrap().date_time,
        created.end.as_ref().unwrap().date_time
    );
}

// --- update back-fill ---

#[tokio::test]
async fn update_submits_a_fully_backfilled_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events/ev1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ev1",
            "iCalUID": "uid-1",
            "summary": "Old title",
            "description": "Old notes",
            "start": { "dateTime": "2030-01-01T09:00:00Z" },
            "end": { "dateTime": "2030-01-01T10:00:00Z" },
            "attendees": [{ "email": "a@example.com", "responseStatus": "accepted" }],
        })))
        .expect(1)
        .mount(&server)
        .await;

    // The PUT body must carry the fields the patch left unset, sourced from
    // the fetch above, including fields the client does not model (iCalUID).
    Mock::given(method("PUT"))
        .and(path("/calendars/primary/events/ev1"))
        .and(body_partial_json(json!({
            "summary": "New title",
            "description": "Old notes",
            "iCalUID": "uid-1",
            "end": { "dateTime": "2030-01-01T10:00:00Z" },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(event_json("ev1", "New title")))
        .expect(1)
        .mount(&server)
        .await;

    let patch = EventPatch {
        summary: Some("New title".to_string()),
        ..EventPatch::default()
    };

    let updated = client_for(&server).update("ev1", &patch).await.unwrap();
    assert_eq!(updated.summary.as_deref(), Some("New title"));
}

// --- upcoming list ---

#[tokio::test]
async fn list_upcoming_requests_expanded_ordered_events() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("singleEvents", "true"))
        .and(query_param("orderBy", "startTime"))
        .and(query_param("maxResults", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [event_json("e1", "First"), event_json("e2", "Second")],
        })))
        .mount(&server)
        .await;

    let events = client_for(&server).list_upcoming(10).await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].summary_str(), "First");
}

#[tokio::test]
async fn empty_upcoming_list_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let events = client_for(&server).list_upcoming(10).await.unwrap();
    assert!(events.is_empty());
}

// --- summary search ---

#[tokio::test]
async fn find_by_summary_scans_one_large_page_client_side() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(query_param("maxResults", "2500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                event_json("e1", "Team meeting"),
                event_json("e2", "Lunch"),
                event_json("e3", "MEETING prep"),
            ],
        })))
        .mount(&server)
        .await;

    let matches = client_for(&server)
        .find_by_summary("meeting", 5)
        .await
        .unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].id_str(), "e1");
    assert_eq!(matches[1].id_str(), "e3");
}

#[tokio::test]
async fn delete_by_summary_continues_after_a_failed_delete() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [event_json("e1", "Standup"), event_json("e2", "Standup (EU)")],
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/calendars/primary/events/e1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/calendars/primary/events/e2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let outcomes = client_for(&server).delete_by_summary("standup").await.unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(matches!(
        outcomes[0].result,
        Err(CalendarError::Transport(_))
    ));
    assert!(outcomes[1].result.is_ok());
}

// --- import ---

#[tokio::test]
async fn import_shifts_times_and_defaults_end_to_one_hour() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events/ev1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ev1",
            "etag": "\"v7\"",
            "iCalUID": "uid-1",
            "summary": "Workshop",
            "start": { "dateTime": "2030-01-01T09:00:00Z" },
            "end": { "dateTime": "2030-01-01T10:00:00Z" },
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/calendars/primary/events/import"))
        .and(body_partial_json(json!({
            "iCalUID": "uid-1",
            "start": { "dateTime": "2030-06-01T14:00:00Z", "timeZone": "UTC" },
            "end": { "dateTime": "2030-06-01T15:00:00Z", "timeZone": "UTC" },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(event_json("ev2", "Workshop")))
        .expect(1)
        .mount(&server)
        .await;

    let new_start = Utc.with_ymd_and_hms(2030, 6, 1, 14, 0, 0).unwrap();
    let imported = client_for(&server)
        .import_shifted("ev1", new_start, None)
        .await
        .unwrap();
    assert_eq!(imported.id_str(), "ev2");
}

// --- instance pagination ---

#[tokio::test]
async fn instances_follow_continuation_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events/rec/instances"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [event_json("i1", "Weekly")],
            "nextPageToken": "t2",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events/rec/instances"))
        .and(query_param("pageToken", "t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [event_json("i2", "Weekly")],
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut pages = client.instances("rec");

    let first = pages.next_page().await.unwrap().unwrap();
    assert_eq!(first[0].id_str(), "i1");

    let second = pages.next_page().await.unwrap().unwrap();
    assert_eq!(second[0].id_str(), "i2");

    assert!(pages.next_page().await.unwrap().is_none());

    // A fresh call restarts from the first page.
    let mut restarted = client.instances("rec");
    let first_again = restarted.next_page().await.unwrap().unwrap();
    assert_eq!(first_again[0].id_str(), "i1");
}

#[tokio::test]
async fn update_instances_records_one_outcome_per_occurrence() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events/rec/instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [event_json("i1", "Weekly"), event_json("i2", "Weekly")],
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/calendars/primary/events/i1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    // The occurrence keeps its own start time; only the summary is overlaid.
    Mock::given(method("PUT"))
        .and(path("/calendars/primary/events/i2"))
        .and(body_partial_json(json!({
            "summary": "Renamed",
            "start": { "dateTime": "2030-01-01T09:00:00Z" },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(event_json("i2", "Renamed")))
        .expect(1)
        .mount(&server)
        .await;

    let patch = EventPatch {
        summary: Some("Renamed".to_string()),
        ..EventPatch::default()
    };

    let outcomes = client_for(&server)
        .update_instances("rec", &patch)
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].id, "i1");
    assert!(outcomes[0].result.is_err());
    assert_eq!(outcomes[1].id, "i2");
    assert!(outcomes[1].result.is_ok());
}

// --- access rules ---

#[tokio::test]
async fn insert_acl_rule_sends_scope_and_role() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/calendars/primary/acl"))
        .and(body_partial_json(json!({
            "scope": { "type": "user", "value": "x@example.com" },
            "role": "writer",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "user:x@example.com",
            "scope": { "type": "user", "value": "x@example.com" },
            "role": "writer",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let rule = client_for(&server)
        .insert_acl_rule("x@example.com", AclRole::Writer)
        .await
        .unwrap();
    assert_eq!(rule.id.as_deref(), Some("user:x@example.com"));
    assert_eq!(rule.role, AclRole::Writer);
}

#[tokio::test]
async fn delete_unknown_acl_rule_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/calendars/primary/acl/user:ghost@example.com"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .delete_acl_rule("user:ghost@example.com")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn list_acl_rules_parses_the_rule_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/acl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "user:owner@example.com",
                    "scope": { "type": "user", "value": "owner@example.com" },
                    "role": "owner",
                },
                {
                    "id": "default",
                    "scope": { "type": "default" },
                    "role": "reader",
                },
            ],
        })))
        .mount(&server)
        .await;

    let rules = client_for(&server).list_acl_rules().await.unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].role, AclRole::Owner);
    assert_eq!(rules[1].scope.to_string(), "default");
}

// --- calendar list ---

#[tokio::test]
async fn list_calendars_parses_entries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me/calendarList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": "primary-id", "summary": "Personal", "primary": true },
                { "id": "team-id", "summary": "Team" },
            ],
        })))
        .mount(&server)
        .await;

    let calendars = client_for(&server).list_calendars().await.unwrap();
    assert_eq!(calendars.len(), 2);
    assert!(calendars[0].primary);
    assert!(!calendars[1].primary);
}
