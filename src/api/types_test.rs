use serde_json::json;

use super::*;

// =============================================================================
// Envelope
// =============================================================================

#[test]
fn envelope_accepts_wrapped_list() {
    let raw = json!({ "success": true, "count": 1, "data": [{ "_id": "u1", "email": "a@b.com", "wrikeId": "W1" }] });
    let users: Vec<User> = serde_json::from_value::<Envelope<Vec<User>>>(raw).unwrap().into_inner();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, "u1");
    assert_eq!(users[0].wrike_id, "W1");
}

#[test]
fn envelope_accepts_bare_list() {
    let raw = json!([{ "_id": "l1", "wrikeApiCalls": 2 }, { "_id": "l2" }]);
    let logs: Vec<ApiLog> = serde_json::from_value::<Envelope<Vec<ApiLog>>>(raw).unwrap().into_inner();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[1].wrike_api_calls, 0);
}

#[test]
fn envelope_accepts_empty_bare_list() {
    let logs: Vec<ApiLog> = serde_json::from_value::<Envelope<Vec<ApiLog>>>(json!([])).unwrap().into_inner();
    assert!(logs.is_empty());
}

#[test]
fn envelope_accepts_wrapped_and_bare_identity() {
    let wrapped = json!({ "data": { "_id": "me", "email": "ops@example.com", "role": "admin" } });
    let bare = json!({ "id": "me", "email": "ops@example.com", "role": "admin" });
    let a = serde_json::from_value::<Envelope<Identity>>(wrapped).unwrap().into_inner();
    let b = serde_json::from_value::<Envelope<Identity>>(bare).unwrap().into_inner();
    assert_eq!(a, b);
    assert_eq!(a.id.as_deref(), Some("me"));
}

// =============================================================================
// Records
// =============================================================================

#[test]
fn task_decodes_camel_case_fields() {
    let raw = json!({
        "_id": "t1",
        "wrikeTaskId": "IEAB123",
        "webworkTaskId": 42,
        "webworkProjectId": 7,
        "webworkUserId": 9,
        "email": "dev@example.com",
        "wrikeStartDate": "2024-03-01T00:00:00.000Z",
        "wrikeEndDate": "2024-03-05T00:00:00.000Z",
        "wrikeEffort": 6.5,
        "timeSpent": 3,
        "createdAt": "2024-03-01T10:00:00.000Z"
    });
    let task: Task = serde_json::from_value(raw).unwrap();
    assert_eq!(task.wrike_task_id, "IEAB123");
    assert_eq!(task.webwork_task_id, Some(42));
    assert!((task.wrike_effort - 6.5).abs() < f64::EPSILON);
    assert!((task.time_spent - 3.0).abs() < f64::EPSILON);
}

#[test]
fn null_display_fields_decode_as_defaults() {
    let users: Envelope<Vec<User>> = serde_json::from_value(json!({
        "data": [{ "_id": "u1", "email": "a@x.com", "wrikeId": null, "webworkId": null }]
    }))
    .unwrap();
    let users = users.into_inner();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].wrike_id, "");
    assert_eq!(users[0].webwork_id, None);

    let tasks: Envelope<Vec<Task>> = serde_json::from_value(json!([
        { "_id": "t1", "wrikeTaskId": "WT-1", "email": null, "wrikeEffort": null, "timeSpent": null }
    ]))
    .unwrap();
    let tasks = tasks.into_inner();
    assert_eq!(tasks[0].email, "");
    assert!(tasks[0].wrike_effort.abs() < f64::EPSILON);

    let logs: Envelope<Vec<ApiLog>> = serde_json::from_value(json!({
        "data": [{ "_id": null, "wrikeApiCalls": 2, "webworkApiCalls": null, "databaseApiCalls": 1 }]
    }))
    .unwrap();
    let logs = logs.into_inner();
    assert_eq!(logs[0].id, "");
    assert_eq!(logs[0].total_calls(), 3);
}

#[test]
fn api_log_total_calls_saturates() {
    let log = ApiLog {
        id: "l1".into(),
        wrike_api_calls: u64::MAX,
        webwork_api_calls: 1,
        database_api_calls: 1,
        timestamp: None,
    };
    assert_eq!(log.total_calls(), u64::MAX);
}

#[test]
fn api_log_total_calls_sums_all_sources() {
    let log = ApiLog {
        id: "l1".into(),
        wrike_api_calls: 3,
        webwork_api_calls: 4,
        database_api_calls: 5,
        timestamp: None,
    };
    assert_eq!(log.total_calls(), 12);
}

#[test]
fn setting_display_value_unquotes_strings() {
    let s: Setting = serde_json::from_value(json!({ "_id": "s1", "key": "mode", "value": "sync" })).unwrap();
    assert_eq!(s.display_value(), "sync");
    let n: Setting = serde_json::from_value(json!({ "_id": "s2", "key": "batch", "value": 50 })).unwrap();
    assert_eq!(n.display_value(), "50");
    let missing: Setting = serde_json::from_value(json!({ "key": "empty" })).unwrap();
    assert_eq!(missing.display_value(), "");
}

#[test]
fn login_response_defaults_optional_fields() {
    let resp: LoginResponse = serde_json::from_value(json!({ "token": "abc" })).unwrap();
    assert_eq!(resp.token, "abc");
    assert!(resp.expires_in.is_none());
    assert!(resp.user.is_none());
}

#[test]
fn user_input_serializes_camel_case() {
    let input = UserInput { email: "a@b.com".into(), wrike_id: "W1".into(), webwork_id: Some(12) };
    assert_eq!(
        serde_json::to_value(&input).unwrap(),
        json!({ "email": "a@b.com", "wrikeId": "W1", "webworkId": 12 })
    );
}

#[test]
fn token_kind_parse_and_path_segment() {
    assert_eq!(TokenKind::parse("wrike"), Some(TokenKind::Wrike));
    assert_eq!(TokenKind::parse("webwork"), Some(TokenKind::Webwork));
    assert_eq!(TokenKind::parse("jira"), None);
    assert_eq!(TokenKind::Webwork.as_str(), "webwork");
}

#[test]
fn demo_admin_has_admin_role() {
    let admin = Identity::demo_admin();
    assert_eq!(admin.email, "admin");
    assert_eq!(admin.role.as_deref(), Some("admin"));
}
