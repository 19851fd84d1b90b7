use axum::body::Body;
use axum::http::{Request, header};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::config::DemoMode;
use crate::routes::app;
use crate::routes::cookies::{TOKEN_COOKIE, TOKEN_EXPIRY_COOKIE};
use crate::services::session::{DEMO_TOKEN_PREFIX, LOGIN_ENDPOINT, LOGIN_PATH};

fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_owned())).unwrap()
}

fn set_cookies(resp: &Response) -> Vec<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_owned())
        .collect()
}

fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    cookies
        .iter()
        .find_map(|c| c.strip_prefix(&prefix).map(|rest| rest.split(';').next().unwrap_or("").to_owned()))
}

async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn live_cookie() -> String {
    let expiry = (time::OffsetDateTime::now_utc() + time::Duration::hours(1)).unix_timestamp() * 1000;
    format!("{TOKEN_COOKIE}=tok; {TOKEN_EXPIRY_COOKIE}={expiry}")
}

// =============================================================================
// GET /login
// =============================================================================

#[tokio::test]
async fn login_form_renders_without_demo_button_by_default() {
    let server = MockServer::start().await;
    let resp = app(AppState::for_backend(&server.uri(), DemoMode::Disabled))
        .oneshot(Request::builder().uri(LOGIN_PATH).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("name=\"password\""));
    assert!(!html.contains("Use Default Login"));
}

#[tokio::test]
async fn login_form_offers_demo_button_in_demo_mode() {
    let server = MockServer::start().await;
    let resp = app(AppState::for_backend(&server.uri(), DemoMode::Enabled))
        .oneshot(Request::builder().uri(LOGIN_PATH).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(body_text(resp).await.contains("Use Default Login (admin)"));
}

// =============================================================================
// POST /login
// =============================================================================

#[tokio::test]
async fn successful_login_sets_cookies_and_goes_home() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_ENDPOINT))
        .and(body_json(json!({ "email": "ops@example.com", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "backend-token",
            "expiresIn": 3600,
            "user": { "_id": "u1", "email": "ops@example.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = app(AppState::for_backend(&server.uri(), DemoMode::Disabled))
        .oneshot(form_post(LOGIN_PATH, "email=ops%40example.com&password=pw", None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), HOME_PATH);
    let cookies = set_cookies(&resp);
    assert_eq!(cookie_value(&cookies, TOKEN_COOKIE).as_deref(), Some("backend-token"));
    assert!(cookie_value(&cookies, TOKEN_EXPIRY_COOKIE).is_some());
    assert!(cookies.iter().all(|c| c.contains("HttpOnly")));
}

#[tokio::test]
async fn rejected_login_rerenders_form_with_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_ENDPOINT))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })))
        .mount(&server)
        .await;

    let resp = app(AppState::for_backend(&server.uri(), DemoMode::Disabled))
        .oneshot(form_post(LOGIN_PATH, "email=ops%40example.com&password=wrong", None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(cookie_value(&set_cookies(&resp), TOKEN_COOKIE).is_none());
    let html = body_text(resp).await;
    assert!(html.contains("Invalid credentials"));
    assert!(html.contains("ops@example.com"));
}

#[tokio::test]
async fn unreachable_backend_shows_generic_failure() {
    let resp = app(AppState::for_backend("http://127.0.0.1:9", DemoMode::Disabled))
        .oneshot(form_post(LOGIN_PATH, "email=ops%40example.com&password=pw", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(body_text(resp).await.contains("Failed to login"));
}

#[tokio::test]
async fn missing_credentials_are_rejected_before_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(500)).expect(0).mount(&server).await;

    let resp = app(AppState::for_backend(&server.uri(), DemoMode::Disabled))
        .oneshot(form_post(LOGIN_PATH, "email=&password=", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("Email and password are required"));
}

#[tokio::test]
async fn demo_button_logs_in_without_backend_in_demo_mode() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(500)).expect(0).mount(&server).await;

    let resp = app(AppState::for_backend(&server.uri(), DemoMode::Enabled))
        .oneshot(form_post(LOGIN_PATH, "mode=demo", None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let token = cookie_value(&set_cookies(&resp), TOKEN_COOKIE).unwrap();
    assert!(token.starts_with(DEMO_TOKEN_PREFIX));
}

#[tokio::test]
async fn demo_button_is_refused_when_demo_mode_is_off() {
    let server = MockServer::start().await;
    let resp = app(AppState::for_backend(&server.uri(), DemoMode::Disabled))
        .oneshot(form_post(LOGIN_PATH, "mode=demo", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(body_text(resp).await.contains("Demo login is disabled"));
}

#[tokio::test]
async fn login_post_with_valid_session_redirects_home() {
    let server = MockServer::start().await;
    let cookie = live_cookie();
    let resp = app(AppState::for_backend(&server.uri(), DemoMode::Disabled))
        .oneshot(form_post(LOGIN_PATH, "email=a&password=b", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), HOME_PATH);
}

// =============================================================================
// POST /logout
// =============================================================================

#[tokio::test]
async fn logout_clears_cookies_and_redirects_to_login() {
    let server = MockServer::start().await;
    let cookie = live_cookie();
    let resp = app(AppState::for_backend(&server.uri(), DemoMode::Disabled))
        .oneshot(form_post("/logout", "", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), LOGIN_PATH);
    let cookies = set_cookies(&resp);
    assert_eq!(cookie_value(&cookies, TOKEN_COOKIE).as_deref(), Some(""));
    assert_eq!(cookie_value(&cookies, TOKEN_EXPIRY_COOKIE).as_deref(), Some(""));
}

#[tokio::test]
async fn anonymous_logout_is_sent_to_login() {
    let server = MockServer::start().await;
    let resp = app(AppState::for_backend(&server.uri(), DemoMode::Disabled))
        .oneshot(form_post("/logout", "", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), LOGIN_PATH);
}
