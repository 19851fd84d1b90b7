//! Operator session store and credential token handling.
//!
//! ARCHITECTURE
//! ============
//! A [`SessionStore`] is one explicit object: it owns the persisted token slot
//! and the in-memory [`Session`], and it is the only writer of either. Route
//! handlers build one per request from that request's cookies and read the
//! slot back out when they answer.
//!
//! States: `Anonymous -> Authenticating -> Authenticated | Error`, plus
//! `Authenticated -> Anonymous` on logout or when the backend rejects the
//! token.
//!
//! TRADE-OFFS
//! ==========
//! The sentinel `admin`/`admin` login only exists when demo mode is enabled at
//! startup. Demo tokens carry a recognizable prefix so a later session check
//! can resolve them without the backend, and they are refused outright once
//! demo mode is off.

use std::fmt::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::Rng;
use serde_json::json;
use time::{Duration, OffsetDateTime};
use tokio_util::sync::CancellationToken;

use crate::api::types::{Envelope, Identity, LoginResponse};
use crate::api::{ApiClient, ApiError, decode};
use crate::config::DemoMode;

pub const LOGIN_PATH: &str = "/login";
pub const LOGIN_ENDPOINT: &str = "/api/auth/login";
pub const ME_ENDPOINT: &str = "/api/auth/me";

/// Lifetime assumed when the login response omits `expiresIn`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 24 * 60 * 60;
const MAX_TOKEN_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

pub const DEMO_TOKEN_PREFIX: &str = "demo.";
const SENTINEL_EMAIL: &str = "admin";
const SENTINEL_PASSWORD: &str = "admin";
const LOGIN_FAILED_MESSAGE: &str = "Failed to login";
const DEMO_DISABLED_MESSAGE: &str = "Demo login is disabled";

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

// =============================================================================
// CREDENTIAL TOKEN
// =============================================================================

/// Opaque bearer value plus the absolute instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialToken {
    pub value: String,
    pub expires_at: OffsetDateTime,
}

impl CredentialToken {
    /// Token valid for `lifetime_secs` from now (clamped to one year).
    #[must_use]
    pub fn issued_now(value: String, lifetime_secs: u64) -> Self {
        let secs = i64::try_from(lifetime_secs.min(MAX_TOKEN_LIFETIME_SECS)).unwrap_or(0);
        Self { value, expires_at: OffsetDateTime::now_utc() + Duration::seconds(secs) }
    }

    /// Rebuild a token from its persisted value and epoch-millisecond expiry.
    ///
    /// Returns `None` when the value is empty or the expiry is unreadable.
    #[must_use]
    pub fn from_parts(value: &str, expiry_millis: &str) -> Option<Self> {
        if value.is_empty() {
            return None;
        }
        let millis = expiry_millis.trim().parse::<i64>().ok()?;
        let expires_at = OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()?;
        Some(Self { value: value.to_owned(), expires_at })
    }

    #[must_use]
    pub fn expires_at_millis(&self) -> i64 {
        i64::try_from(self.expires_at.unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
    }

    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }

    /// Remaining validity, zero once expired.
    #[must_use]
    pub fn remaining_at(&self, now: OffsetDateTime) -> Duration {
        if self.is_expired_at(now) { Duration::ZERO } else { self.expires_at - now }
    }

    #[must_use]
    pub fn is_demo(&self) -> bool {
        self.value.starts_with(DEMO_TOKEN_PREFIX)
    }
}

/// Persisted, client-accessible slot holding at most one credential token.
pub trait TokenSlot: Send + Sync {
    fn load(&self) -> Option<CredentialToken>;
    fn store(&self, token: &CredentialToken);
    fn clear(&self);
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated,
    Error,
}

/// Snapshot of who the operator is. Never persisted; derived from the token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub status: SessionStatus,
    pub user: Option<Identity>,
    pub last_error: Option<String>,
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Authenticating
    }

    fn authenticated(user: Identity) -> Self {
        Self { status: SessionStatus::Authenticated, user: Some(user), last_error: None }
    }

    fn failed(message: String) -> Self {
        Self { status: SessionStatus::Error, user: None, last_error: Some(message) }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Login rejected, either by the backend or because it was unreachable.
    #[error("{0}")]
    AuthFailure(String),

    /// A token was present but is expired or was rejected by "who am I".
    #[error("session expired")]
    SessionExpired,

    /// Another login on the same store has not resolved yet.
    #[error("a login attempt is already in progress")]
    LoginInProgress,

    #[error(transparent)]
    Api(#[from] ApiError),
}

// =============================================================================
// STORE
// =============================================================================

pub struct SessionStore<S> {
    api: ApiClient,
    slot: S,
    demo_mode: DemoMode,
    state: Mutex<Session>,
    login_gate: tokio::sync::Mutex<()>,
}

impl<S: TokenSlot> SessionStore<S> {
    #[must_use]
    pub fn new(api: ApiClient, slot: S, demo_mode: DemoMode) -> Self {
        Self {
            api,
            slot,
            demo_mode,
            state: Mutex::new(Session::default()),
            login_gate: tokio::sync::Mutex::new(()),
        }
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.lock().clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<CredentialToken> {
        self.slot.load()
    }

    /// Give the slot back to the caller (e.g. to emit updated cookies).
    pub fn into_slot(self) -> S {
        self.slot
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, next: Session) {
        *self.lock() = next;
    }

    fn discard(&self) {
        self.slot.clear();
        self.transition(Session::default());
    }

    /// Resolve the persisted token into an identity.
    ///
    /// `Ok(None)` when no token is stored.
    ///
    /// # Errors
    ///
    /// `SessionExpired` when the token is expired or rejected (the token is
    /// discarded); `Api` for any other backend failure (the token is kept).
    pub async fn check_session(&self, cancel: &CancellationToken) -> Result<Option<Identity>, AuthError> {
        let Some(token) = self.slot.load() else {
            self.transition(Session::default());
            return Ok(None);
        };

        if token.is_expired() {
            tracing::info!("stored credential expired; discarding");
            self.discard();
            return Err(AuthError::SessionExpired);
        }

        if token.is_demo() {
            if !self.demo_mode.is_enabled() {
                tracing::warn!("demo credential presented while demo mode is disabled");
                self.discard();
                return Err(AuthError::SessionExpired);
            }
            let identity = Identity::demo_admin();
            self.transition(Session::authenticated(identity.clone()));
            return Ok(Some(identity));
        }

        match fetch_identity(&self.api.authorized(&token.value), cancel).await {
            Ok(identity) => {
                self.transition(Session::authenticated(identity.clone()));
                Ok(Some(identity))
            }
            Err(e) if e.is_unauthorized() => {
                tracing::info!("backend rejected stored credential; discarding");
                self.discard();
                Err(AuthError::SessionExpired)
            }
            Err(e) => {
                self.transition(Session::failed(e.to_string()));
                Err(AuthError::Api(e))
            }
        }
    }

    /// Authenticate the operator and persist the resulting token.
    ///
    /// # Errors
    ///
    /// `LoginInProgress` if another login on this store is in flight;
    /// `AuthFailure` with a displayable message when the login is rejected or
    /// the backend is unreachable; `Api(Cancelled)` when `cancel` fires.
    pub async fn login(&self, email: &str, password: &str, cancel: &CancellationToken) -> Result<Identity, AuthError> {
        let Ok(_in_flight) = self.login_gate.try_lock() else {
            tracing::warn!(email, "login rejected: another attempt is in flight");
            return Err(AuthError::LoginInProgress);
        };

        self.transition(Session { status: SessionStatus::Authenticating, user: None, last_error: None });

        let result = if self.demo_mode.is_enabled() && is_sentinel(email, password) {
            tracing::warn!("demo mode login used");
            Ok(demo_credentials())
        } else {
            self.backend_login(email, password, cancel).await
        };

        match result {
            Ok((token, identity)) => {
                self.slot.store(&token);
                self.transition(Session::authenticated(identity.clone()));
                tracing::info!(email = %identity.email, "operator logged in");
                Ok(identity)
            }
            Err(ApiError::Cancelled) => {
                self.discard();
                Err(AuthError::Api(ApiError::Cancelled))
            }
            Err(e) => {
                self.slot.clear();
                let message = login_failure_message(&e);
                tracing::warn!(email, error = %e, "login failed");
                self.transition(Session::failed(message.clone()));
                Err(AuthError::AuthFailure(message))
            }
        }
    }

    /// One-click login with the sentinel pair.
    ///
    /// # Errors
    ///
    /// `AuthFailure` when demo mode is disabled; otherwise as [`Self::login`].
    pub async fn demo_login(&self, cancel: &CancellationToken) -> Result<Identity, AuthError> {
        if !self.demo_mode.is_enabled() {
            return Err(AuthError::AuthFailure(DEMO_DISABLED_MESSAGE.to_owned()));
        }
        self.login(SENTINEL_EMAIL, SENTINEL_PASSWORD, cancel).await
    }

    /// Drop the token and identity; returns where to navigate next.
    pub fn logout(&self) -> &'static str {
        self.discard();
        tracing::info!("operator logged out");
        LOGIN_PATH
    }

    async fn backend_login(
        &self,
        email: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> Result<(CredentialToken, Identity), ApiError> {
        let body = json!({ "email": email, "password": password });
        let raw = self.api.post(LOGIN_ENDPOINT, body, cancel).await?;
        let resp = decode::<Envelope<LoginResponse>>(raw)?.into_inner();
        if resp.token.is_empty() {
            return Err(ApiError::Decode("login response carried an empty token".to_owned()));
        }

        let token = CredentialToken::issued_now(resp.token, resp.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS));
        let identity = match resp.user {
            Some(user) => user,
            None => fetch_identity(&self.api.authorized(&token.value), cancel).await?,
        };
        Ok((token, identity))
    }
}

async fn fetch_identity(api: &ApiClient, cancel: &CancellationToken) -> Result<Identity, ApiError> {
    api.get_json::<Envelope<Identity>>(ME_ENDPOINT, cancel)
        .await
        .map(Envelope::into_inner)
}

fn is_sentinel(email: &str, password: &str) -> bool {
    email == SENTINEL_EMAIL && password == SENTINEL_PASSWORD
}

fn demo_credentials() -> (CredentialToken, Identity) {
    let token = CredentialToken::issued_now(format!("{DEMO_TOKEN_PREFIX}{}", generate_token()), DEFAULT_TOKEN_LIFETIME_SECS);
    (token, Identity::demo_admin())
}

/// Backend rejections keep the backend's message; everything else collapses
/// to a generic failure.
pub(crate) fn login_failure_message(err: &ApiError) -> String {
    match err {
        ApiError::Http { status, message } if *message != format!("API error: {status}") => message.clone(),
        _ => LOGIN_FAILED_MESSAGE.to_owned(),
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
