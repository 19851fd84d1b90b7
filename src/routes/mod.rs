//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! A single Axum router serves the server-rendered login and dashboard pages
//! plus the form endpoints behind them. The route guard wraps everything;
//! `/healthz` is exempted inside the guard itself.

pub mod auth;
pub mod cookies;
pub mod dashboard;
pub mod guard;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::show))
        .route("/login", get(auth::login_form).post(auth::login_submit))
        .route("/logout", post(auth::logout))
        .route("/users", post(dashboard::create_user))
        .route("/users/{id}", post(dashboard::update_user))
        .route("/users/{id}/delete", post(dashboard::delete_user))
        .route("/tasks/{id}/delete", post(dashboard::delete_task))
        .route("/settings/batch-size", post(dashboard::update_batch_size))
        .route("/tokens/{kind}", post(dashboard::update_access_token))
        .route("/healthz", get(healthz))
        .layer(axum::middleware::from_fn(guard::route_guard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
