//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the startup configuration and one unauthenticated `ApiClient`; the
//! connection pool inside the client is shared by every request. Session state
//! is not kept here: each request builds its own `SessionStore` over the
//! cookies it arrived with.

use std::sync::Arc;

use axum_extra::extract::cookie::CookieJar;

use crate::api::{ApiClient, ApiError};
use crate::config::DashboardConfig;
use crate::routes::cookies::CookieSlot;
use crate::services::records::RecordsService;
use crate::services::session::{CredentialToken, SessionStore};

/// Shared application state. Clone is required by Axum; the config is
/// Arc-wrapped and the client clones cheaply.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    pub api: ApiClient,
}

impl AppState {
    /// # Errors
    ///
    /// Returns `ApiError::ClientBuild` if the HTTP client cannot be constructed.
    pub fn new(config: DashboardConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api_base_url, config.timeouts)?;
        Ok(Self { config: Arc::new(config), api })
    }

    /// Session store over this request's cookies.
    #[must_use]
    pub fn session_store(&self, jar: CookieJar) -> SessionStore<CookieSlot> {
        SessionStore::new(
            self.api.clone(),
            CookieSlot::new(jar, self.config.cookie_secure),
            self.config.demo_mode,
        )
    }

    /// Records service for the holder of `token`.
    ///
    /// Demo tokens are never sent to the backend; their calls go out
    /// unauthenticated.
    #[must_use]
    pub fn records_for(&self, token: &CredentialToken) -> RecordsService {
        if token.is_demo() {
            RecordsService::new(self.api.clone())
        } else {
            RecordsService::new(self.api.authorized(&token.value))
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State pointed at a mock backend.
    pub(crate) fn for_backend(base_url: &str, demo_mode: crate::config::DemoMode) -> Self {
        let config = DashboardConfig {
            api_base_url: base_url.to_owned(),
            port: crate::config::DEFAULT_PORT,
            demo_mode,
            cookie_secure: false,
            timeouts: crate::config::ApiTimeouts::default(),
        };
        Self::new(config).expect("test state")
    }
}
