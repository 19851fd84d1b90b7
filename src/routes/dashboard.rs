//! Dashboard routes: the tabbed overview page and its record mutations.
//!
//! DESIGN
//! ======
//! Every mutation is a form POST answered with a redirect back to the tab
//! that owns the record (POST-redirect-GET). A `401` from any backend call
//! means the stored token is no longer honoured: cookies are cleared and the
//! operator lands on the login form. Demo tokens are never sent upstream, so
//! for them a `401` is just another backend failure.

use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::api::ApiError;
use crate::api::types::{TokenKind, UserInput};
use crate::pages::dashboard::{self as dashboard_page, DashboardView, Tab};
use crate::pages::error as error_page;
use crate::routes::cookies::{clear_token_cookies, token_from_jar};
use crate::services::session::{AuthError, CredentialToken, LOGIN_PATH};
use crate::state::AppState;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load dashboard data. Please try again later.";
const MAX_RECORD_ID_LEN: usize = 64;

/// Backend record ids are interpolated into upstream paths; only plain
/// identifier characters are accepted.
#[must_use]
pub fn is_valid_record_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_RECORD_ID_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn expired_session(jar: CookieJar) -> Response {
    (clear_token_cookies(jar), Redirect::to(LOGIN_PATH)).into_response()
}

fn error_response(status: StatusCode, message: &str, tab: Tab) -> Response {
    (status, Html(error_page::render(message, &tab.href()))).into_response()
}

/// Backend 4xx answers pass through; everything else is a bad gateway.
fn upstream_status(err: &ApiError) -> StatusCode {
    err.status()
        .filter(|s| (400..500).contains(s))
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

// =============================================================================
// OVERVIEW
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    tab: Option<String>,
    #[serde(default)]
    edit: Option<String>,
}

/// `GET /?tab=..&edit=..`
pub async fn show(
    State(state): State<AppState>,
    Extension(cancel): Extension<CancellationToken>,
    jar: CookieJar,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let tab = Tab::parse(query.tab.as_deref());
    let store = state.session_store(jar);

    let operator = match store.check_session(&cancel).await {
        Ok(Some(identity)) => identity,
        Ok(None) | Err(AuthError::SessionExpired) => {
            return (store.into_slot().into_jar(), Redirect::to(LOGIN_PATH)).into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "session check failed");
            return error_response(StatusCode::BAD_GATEWAY, LOAD_FAILED_MESSAGE, tab);
        }
    };

    let Some(token) = store.token() else {
        return (store.into_slot().into_jar(), Redirect::to(LOGIN_PATH)).into_response();
    };
    let records = state.records_for(&token);

    let loaded = if tab == Tab::Settings {
        tokio::try_join!(records.dashboard(&cancel), async { records.settings_panel(&cancel).await.map(Some) })
    } else {
        records.dashboard(&cancel).await.map(|data| (data, None))
    };

    match loaded {
        Ok((data, settings)) => {
            let editing = query.edit.filter(|id| is_valid_record_id(id));
            let html = dashboard_page::render(DashboardView { operator, tab, data, settings, editing });
            (store.into_slot().into_jar(), Html(html)).into_response()
        }
        Err(e) if e.is_unauthorized() && !token.is_demo() => {
            tracing::info!("backend rejected credential during dashboard load");
            store.logout();
            (store.into_slot().into_jar(), Redirect::to(LOGIN_PATH)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, tab = tab.as_str(), "dashboard load failed");
            error_response(StatusCode::BAD_GATEWAY, LOAD_FAILED_MESSAGE, tab)
        }
    }
}

// =============================================================================
// MUTATIONS
// =============================================================================

/// The persisted token, unless it is a demo token and demo mode is off.
fn usable_token(state: &AppState, jar: &CookieJar) -> Option<CredentialToken> {
    token_from_jar(jar).filter(|t| !t.is_demo() || state.config.demo_mode.is_enabled())
}

/// Shared tail of every mutation handler.
fn finish_mutation(result: Result<(), ApiError>, jar: CookieJar, demo: bool, tab: Tab, action: &str) -> Response {
    match result {
        Ok(()) => Redirect::to(&tab.href()).into_response(),
        Err(e) if e.is_unauthorized() && !demo => {
            tracing::info!(action, "backend rejected credential during mutation");
            expired_session(jar)
        }
        Err(e) => {
            tracing::warn!(action, error = %e, "mutation failed");
            error_response(upstream_status(&e), &e.to_string(), tab)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    wrike_id: String,
    #[serde(default)]
    webwork_id: String,
}

impl UserForm {
    /// Trimmed, validated backend body.
    fn into_input(self) -> Result<UserInput, &'static str> {
        let email = self.email.trim().to_owned();
        let wrike_id = self.wrike_id.trim().to_owned();
        if email.is_empty() || wrike_id.is_empty() {
            return Err("Email and Wrike ID are required");
        }
        let webwork_id = match self.webwork_id.trim() {
            "" => None,
            raw => Some(raw.parse::<i64>().map_err(|_| "Webwork ID must be a whole number")?),
        };
        Ok(UserInput { email, wrike_id, webwork_id })
    }
}

/// `POST /users`
pub async fn create_user(
    State(state): State<AppState>,
    Extension(cancel): Extension<CancellationToken>,
    jar: CookieJar,
    Form(form): Form<UserForm>,
) -> Response {
    let Some(token) = usable_token(&state, &jar) else {
        return expired_session(jar);
    };
    let input = match form.into_input() {
        Ok(input) => input,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message, Tab::Users),
    };
    let result = state.records_for(&token).create_user(&input, &cancel).await;
    finish_mutation(result, jar, token.is_demo(), Tab::Users, "create_user")
}

/// `POST /users/{id}`
pub async fn update_user(
    State(state): State<AppState>,
    Extension(cancel): Extension<CancellationToken>,
    Path(id): Path<String>,
    jar: CookieJar,
    Form(form): Form<UserForm>,
) -> Response {
    let Some(token) = usable_token(&state, &jar) else {
        return expired_session(jar);
    };
    if !is_valid_record_id(&id) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid user id", Tab::Users);
    }
    let input = match form.into_input() {
        Ok(input) => input,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message, Tab::Users),
    };
    let result = state.records_for(&token).update_user(&id, &input, &cancel).await;
    finish_mutation(result, jar, token.is_demo(), Tab::Users, "update_user")
}

/// `POST /users/{id}/delete`
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(cancel): Extension<CancellationToken>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Response {
    let Some(token) = usable_token(&state, &jar) else {
        return expired_session(jar);
    };
    if !is_valid_record_id(&id) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid user id", Tab::Users);
    }
    let result = state.records_for(&token).delete_user(&id, &cancel).await;
    finish_mutation(result, jar, token.is_demo(), Tab::Users, "delete_user")
}

/// `POST /tasks/{id}/delete`
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(cancel): Extension<CancellationToken>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Response {
    let Some(token) = usable_token(&state, &jar) else {
        return expired_session(jar);
    };
    if !is_valid_record_id(&id) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid task id", Tab::Tasks);
    }
    let result = state.records_for(&token).delete_task(&id, &cancel).await;
    finish_mutation(result, jar, token.is_demo(), Tab::Tasks, "delete_task")
}

#[derive(Debug, Deserialize)]
pub struct BatchSizeForm {
    #[serde(default)]
    batch_size: String,
}

/// `POST /settings/batch-size`
pub async fn update_batch_size(
    State(state): State<AppState>,
    Extension(cancel): Extension<CancellationToken>,
    jar: CookieJar,
    Form(form): Form<BatchSizeForm>,
) -> Response {
    let Some(token) = usable_token(&state, &jar) else {
        return expired_session(jar);
    };
    let batch_size = match form.batch_size.trim().parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Batch size must be a positive whole number",
                Tab::Settings,
            );
        }
    };
    let result = state.records_for(&token).set_batch_size(batch_size, &cancel).await;
    if let Ok(stored) = &result {
        tracing::info!(batch_size = stored.batch_size, "batch size updated");
    }
    finish_mutation(result.map(|_| ()), jar, token.is_demo(), Tab::Settings, "update_batch_size")
}

#[derive(Debug, Deserialize)]
pub struct TokenForm {
    #[serde(default)]
    token: String,
}

/// `POST /tokens/{wrike|webwork}`
pub async fn update_access_token(
    State(state): State<AppState>,
    Extension(cancel): Extension<CancellationToken>,
    Path(kind): Path<String>,
    jar: CookieJar,
    Form(form): Form<TokenForm>,
) -> Response {
    let Some(token) = usable_token(&state, &jar) else {
        return expired_session(jar);
    };
    let Some(kind) = TokenKind::parse(&kind) else {
        return error_response(StatusCode::NOT_FOUND, "Unknown token type", Tab::Settings);
    };
    let value = form.token.trim();
    if value.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Token must not be empty", Tab::Settings);
    }
    let result = state.records_for(&token).set_access_token(kind, value, &cancel).await;
    finish_mutation(result, jar, token.is_demo(), Tab::Settings, "update_access_token")
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
