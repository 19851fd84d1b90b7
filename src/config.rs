//! Dashboard configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! Resolved once at startup and shared read-only through `AppState`. Demo mode
//! is decided here so no handler ever compares credentials against a literal
//! unless the operator explicitly opted in.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors produced while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required env var {0}")]
    Missing(&'static str),

    /// An environment variable is set but cannot be parsed.
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Whether the sentinel demo login is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemoMode {
    #[default]
    Disabled,
    Enabled,
}

impl DemoMode {
    #[must_use]
    pub fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiTimeouts {
    pub request: Duration,
    pub connect: Duration,
}

impl Default for ApiTimeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Backend REST base URL without a trailing slash.
    pub api_base_url: String,
    pub port: u16,
    pub demo_mode: DemoMode,
    pub cookie_secure: bool,
    pub timeouts: ApiTimeouts,
}

impl DashboardConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `API_BASE_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DASHBOARD_DEMO_MODE`: default off
    /// - `COOKIE_SECURE`: inferred from the `API_BASE_URL` scheme when absent
    /// - `API_REQUEST_TIMEOUT_SECS`: default 30
    /// - `API_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if `API_BASE_URL` is missing or a value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_base = std::env::var("API_BASE_URL").map_err(|_| ConfigError::Missing("API_BASE_URL"))?;
        let api_base_url = normalize_base_url(&raw_base);
        if api_base_url.is_empty() {
            return Err(ConfigError::Invalid { var: "API_BASE_URL", value: raw_base });
        }

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value: raw })?,
            Err(_) => DEFAULT_PORT,
        };

        let demo_mode = if env_bool("DASHBOARD_DEMO_MODE").unwrap_or(false) {
            DemoMode::Enabled
        } else {
            DemoMode::Disabled
        };
        let cookie_secure = env_bool("COOKIE_SECURE").unwrap_or_else(|| api_base_url.starts_with("https://"));
        let timeouts = ApiTimeouts {
            request: Duration::from_secs(env_parse_u64("API_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)),
            connect: Duration::from_secs(env_parse_u64("API_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)),
        };

        Ok(Self { api_base_url, port, demo_mode, cookie_secure, timeouts })
    }
}

pub(crate) fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| parse_bool(&raw))
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
