//! Cookie-backed credential slot.
//!
//! The bearer value lives in `token` and its absolute expiry (epoch millis)
//! in `token_expiry`; both carry a `Max-Age` equal to the remaining validity so
//! the browser drops them at the same moment the guard stops trusting them.

use std::sync::{Mutex, PoisonError};

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::OffsetDateTime;

use crate::services::session::{CredentialToken, TokenSlot};

pub const TOKEN_COOKIE: &str = "token";
pub const TOKEN_EXPIRY_COOKIE: &str = "token_expiry";

/// Read the persisted credential from request cookies.
///
/// A token cookie without a readable expiry is treated as absent.
#[must_use]
pub fn token_from_jar(jar: &CookieJar) -> Option<CredentialToken> {
    let value = jar.get(TOKEN_COOKIE).map(Cookie::value)?;
    let expiry = jar.get(TOKEN_EXPIRY_COOKIE).map(Cookie::value)?;
    CredentialToken::from_parts(value, expiry)
}

#[must_use]
pub fn clear_token_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build((TOKEN_COOKIE, "")).path("/"))
        .remove(Cookie::build((TOKEN_EXPIRY_COOKIE, "")).path("/"))
}

fn token_cookie(name: &'static str, value: String, token: &CredentialToken, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(token.remaining_at(OffsetDateTime::now_utc()))
        .build()
}

/// [`TokenSlot`] over the request's cookie jar; hand the jar back with
/// [`CookieSlot::into_jar`] so the response carries the changes.
pub struct CookieSlot {
    jar: Mutex<CookieJar>,
    secure: bool,
}

impl CookieSlot {
    #[must_use]
    pub fn new(jar: CookieJar, secure: bool) -> Self {
        Self { jar: Mutex::new(jar), secure }
    }

    #[must_use]
    pub fn into_jar(self) -> CookieJar {
        self.jar.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(CookieJar) -> CookieJar) {
        let mut guard = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        let jar = std::mem::replace(&mut *guard, CookieJar::new());
        *guard = f(jar);
    }
}

impl TokenSlot for CookieSlot {
    fn load(&self) -> Option<CredentialToken> {
        token_from_jar(&self.jar.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn store(&self, token: &CredentialToken) {
        let secure = self.secure;
        self.update(|jar| {
            jar.add(token_cookie(TOKEN_COOKIE, token.value.clone(), token, secure))
                .add(token_cookie(TOKEN_EXPIRY_COOKIE, token.expires_at_millis().to_string(), token, secure))
        });
    }

    fn clear(&self) {
        self.update(clear_token_cookies);
    }
}

#[cfg(test)]
#[path = "cookies_test.rs"]
mod tests;
