use axum::Router;
use axum::body::Body;
use axum::http::{Request as HttpRequest, StatusCode, header};
use axum::routing::get;
use tower::ServiceExt;

use super::*;
use crate::routes::cookies::TOKEN_EXPIRY_COOKIE;

// =============================================================================
// Decision table
// =============================================================================

#[test]
fn login_with_valid_token_redirects_home() {
    assert_eq!(guard(LOGIN_PATH, true), GuardDecision::Redirect(HOME_PATH));
}

#[test]
fn login_without_token_proceeds() {
    assert_eq!(guard(LOGIN_PATH, false), GuardDecision::Proceed);
}

#[test]
fn other_path_with_valid_token_proceeds() {
    assert_eq!(guard("/", true), GuardDecision::Proceed);
    assert_eq!(guard("/users/u1/delete", true), GuardDecision::Proceed);
}

#[test]
fn other_path_without_token_redirects_to_login() {
    assert_eq!(guard("/", false), GuardDecision::Redirect(LOGIN_PATH));
    assert_eq!(guard("/logout", false), GuardDecision::Redirect(LOGIN_PATH));
}

#[test]
fn valid_token_never_lands_on_login() {
    for path in ["/", "/login", "/logout", "/settings/batch-size", "/loginx"] {
        assert_ne!(guard(path, true), GuardDecision::Redirect(LOGIN_PATH), "path {path}");
    }
}

#[test]
fn login_match_is_exact() {
    assert_eq!(guard("/login/", false), GuardDecision::Redirect(LOGIN_PATH));
    assert_eq!(guard("/loginx", true), GuardDecision::Proceed);
}

#[test]
fn unguarded_paths() {
    for path in ["/api", "/api/auth/login", "/healthz", "/favicon.ico", "/static/app.css"] {
        assert!(!is_guarded(path), "path {path}");
    }
    for path in ["/", "/login", "/apix", "/static", "/users"] {
        assert!(is_guarded(path), "path {path}");
    }
}

// =============================================================================
// Middleware
// =============================================================================

async fn cancel_probe(axum::Extension(cancel): axum::Extension<CancellationToken>) -> String {
    format!("cancelled={}", cancel.is_cancelled())
}

fn guarded_router() -> Router {
    Router::new()
        .route("/", get(cancel_probe))
        .route("/login", get(|| async { "login form" }))
        .route("/healthz", get(|| async { "ok" }))
        .layer(axum::middleware::from_fn(route_guard))
}

fn cookie_header(expiry_millis: i64) -> String {
    format!("{TOKEN_COOKIE}=tok; {TOKEN_EXPIRY_COOKIE}={expiry_millis}")
}

fn future_millis() -> i64 {
    (time::OffsetDateTime::now_utc() + time::Duration::hours(1)).unix_timestamp() * 1000
}

fn past_millis() -> i64 {
    (time::OffsetDateTime::now_utc() - time::Duration::hours(1)).unix_timestamp() * 1000
}

fn get_request(path: &str, cookie: Option<String>) -> HttpRequest<Body> {
    let mut builder = HttpRequest::builder().uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn location(resp: &Response) -> &str {
    resp.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn anonymous_dashboard_visit_redirects_to_login() {
    let resp = guarded_router().oneshot(get_request("/", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), LOGIN_PATH);
}

#[tokio::test]
async fn valid_token_reaches_handler_with_live_cancel_token() {
    let resp = guarded_router()
        .oneshot(get_request("/", Some(cookie_header(future_millis()))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"cancelled=false");
}

#[tokio::test]
async fn valid_token_on_login_redirects_home() {
    let resp = guarded_router()
        .oneshot(get_request("/login", Some(cookie_header(future_millis()))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), HOME_PATH);
}

#[tokio::test]
async fn expired_token_is_cleared_and_redirected() {
    let resp = guarded_router()
        .oneshot(get_request("/", Some(cookie_header(past_millis()))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), LOGIN_PATH);
    let cleared: Vec<_> = resp.headers().get_all(header::SET_COOKIE).iter().collect();
    assert_eq!(cleared.len(), 2);
}

#[tokio::test]
async fn expired_token_on_login_shows_form_and_clears_cookies() {
    let resp = guarded_router()
        .oneshot(get_request("/login", Some(cookie_header(past_millis()))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(header::SET_COOKIE));
}

#[tokio::test]
async fn token_without_expiry_counts_as_missing() {
    let resp = guarded_router()
        .oneshot(get_request("/", Some(format!("{TOKEN_COOKIE}=tok"))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), LOGIN_PATH);
}

#[tokio::test]
async fn health_check_bypasses_guard() {
    let resp = guarded_router().oneshot(get_request("/healthz", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
