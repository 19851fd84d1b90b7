//! Route guard. Decides, before any page handler runs, whether a navigation
//! proceeds or is redirected.
//!
//! The decision only looks at the persisted token (`token` plus
//! `token_expiry` cookies); it never calls the backend. Whether the backend
//! still honours the token is the dashboard handler's concern.

use axum::extract::Request;
use axum::http::header::SET_COOKIE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use tokio_util::sync::CancellationToken;

use crate::routes::cookies::{TOKEN_COOKIE, clear_token_cookies, token_from_jar};
use crate::services::session::LOGIN_PATH;

pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(&'static str),
}

/// Four-row decision table:
///
/// | path      | valid token | decision          |
/// |-----------|-------------|-------------------|
/// | `/login`  | yes         | redirect to `/`   |
/// | `/login`  | no          | proceed           |
/// | other     | yes         | proceed           |
/// | other     | no          | redirect to login |
#[must_use]
pub fn guard(path: &str, has_valid_token: bool) -> GuardDecision {
    match (path == LOGIN_PATH, has_valid_token) {
        (true, true) => GuardDecision::Redirect(HOME_PATH),
        (false, false) => GuardDecision::Redirect(LOGIN_PATH),
        (true, false) | (false, true) => GuardDecision::Proceed,
    }
}

/// Paths that bypass the guard entirely.
#[must_use]
pub fn is_guarded(path: &str) -> bool {
    !(path == "/api"
        || path.starts_with("/api/")
        || path == "/healthz"
        || path == "/favicon.ico"
        || path.starts_with("/static/"))
}

/// Axum middleware applying [`guard`] to every guarded navigation.
///
/// Stale token cookies (expired or missing their expiry) are cleared on the
/// way through. Handlers that proceed find a per-navigation
/// `CancellationToken` in the request extensions; it fires when the
/// navigation is abandoned.
pub async fn route_guard(jar: CookieJar, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    if !is_guarded(&path) {
        return next.run(req).await;
    }

    let has_valid_token = token_from_jar(&jar).is_some_and(|t| !t.is_expired());
    let stale = !has_valid_token && jar.get(TOKEN_COOKIE).is_some();

    match guard(&path, has_valid_token) {
        GuardDecision::Proceed => {
            let cancel = CancellationToken::new();
            req.extensions_mut().insert(cancel.clone());
            let _abort_on_drop = cancel.drop_guard();
            let response = next.run(req).await;
            // A handler that wrote its own cookies (a fresh login) wins.
            if stale && !response.headers().contains_key(SET_COOKIE) {
                (clear_token_cookies(jar), response).into_response()
            } else {
                response
            }
        }
        GuardDecision::Redirect(target) => {
            tracing::debug!(%path, target, "route guard redirect");
            // 303 so a guarded POST lands on the target as a GET.
            let redirect = Redirect::to(target);
            if stale { (clear_token_cookies(jar), redirect).into_response() } else { redirect.into_response() }
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
