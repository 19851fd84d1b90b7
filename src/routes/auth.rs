//! Auth routes: login form, login submit, logout.

use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::pages::login::{self, LoginView};
use crate::routes::guard::HOME_PATH;
use crate::services::session::AuthError;
use crate::state::AppState;

const MISSING_CREDENTIALS_MESSAGE: &str = "Email and password are required";

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    /// `demo` selects the one-click sentinel login.
    #[serde(default)]
    mode: Option<String>,
}

impl LoginForm {
    fn is_demo(&self) -> bool {
        self.mode.as_deref() == Some("demo")
    }
}

fn login_page(state: &AppState, status: StatusCode, email: String, error: Option<String>) -> Response {
    let view = LoginView { email, error, demo_enabled: state.config.demo_mode.is_enabled() };
    (status, Html(login::render(view))).into_response()
}

fn failure_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::LoginInProgress => StatusCode::CONFLICT,
        AuthError::AuthFailure(_) | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
        AuthError::Api(_) => StatusCode::BAD_GATEWAY,
    }
}

/// `GET /login`
pub async fn login_form(State(state): State<AppState>) -> Response {
    login_page(&state, StatusCode::OK, String::new(), None)
}

/// `POST /login`: authenticate, persist the token cookies, go home.
pub async fn login_submit(
    State(state): State<AppState>,
    Extension(cancel): Extension<CancellationToken>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim().to_owned();
    if !form.is_demo() && (email.is_empty() || form.password.is_empty()) {
        return login_page(&state, StatusCode::BAD_REQUEST, email, Some(MISSING_CREDENTIALS_MESSAGE.to_owned()));
    }

    let store = state.session_store(jar);
    let result = if form.is_demo() {
        store.demo_login(&cancel).await
    } else {
        store.login(&email, &form.password, &cancel).await
    };

    match result {
        Ok(_) => (store.into_slot().into_jar(), Redirect::to(HOME_PATH)).into_response(),
        Err(e) => {
            let message = store.session().last_error.unwrap_or_else(|| e.to_string());
            let status = failure_status(&e);
            let view = LoginView { email, error: Some(message), demo_enabled: state.config.demo_mode.is_enabled() };
            (status, store.into_slot().into_jar(), Html(login::render(view))).into_response()
        }
    }
}

/// `POST /logout`: drop the token cookies and return to the login form.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let store = state.session_store(jar);
    let target = store.logout();
    (store.into_slot().into_jar(), Redirect::to(target)).into_response()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
