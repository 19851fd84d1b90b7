//! Backend REST client.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every backend call made by the dashboard goes through [`ApiClient::request`].
//! Non-success responses are normalized into [`ApiError::Http`] carrying the
//! backend's `message` (or `"API error: <status>"`), so views can always show
//! a displayable string.
//!
//! ERROR HANDLING
//! ==============
//! No retries. Requests are bounded by the configured timeouts and can be
//! aborted through a `CancellationToken`.

pub mod types;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::{ApiTimeouts, normalize_base_url};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused connection, reset).
    #[error("network failure: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The configured request timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// A success response carried a body that could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl ApiError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() { Self::Timeout } else { Self::Network(err.to_string()) }
    }

    /// True when the backend rejected the bearer credential.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status: 401, .. })
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// Thin JSON-over-HTTP wrapper around the backend base URL.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl ApiClient {
    /// Build a client for `base_url` with bounded timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: &str, timeouts: ApiTimeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request)
            .connect_timeout(timeouts.connect)
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: normalize_base_url(base_url), bearer: None })
    }

    /// Return a client that sends `Authorization: Bearer <token>` on every call.
    #[must_use]
    pub fn authorized(&self, token: &str) -> Self {
        Self { http: self.http.clone(), base_url: self.base_url.clone(), bearer: Some(token.to_owned()) }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Execute one request and return the decoded JSON body unchanged.
    ///
    /// Empty success bodies decode to `Value::Null`.
    ///
    /// # Errors
    ///
    /// See [`ApiError`]; a cancelled `cancel` token yields `ApiError::Cancelled`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        cancel: &CancellationToken,
    ) -> Result<Value, ApiError> {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }

        let url = self.url(path);
        let mut req = self.http.request(method.clone(), &url);
        if let Some(token) = &self.bearer {
            req = req.bearer_auth(token);
        }
        if let Some(body) = &body {
            req = req.json(body);
        }

        let result = tokio::select! {
            () = cancel.cancelled() => Err(ApiError::Cancelled),
            result = execute(req) => result,
        };

        if let Err(e) = &result {
            tracing::warn!(%method, path, error = %e, "backend request failed");
        }
        result
    }

    pub async fn get(&self, path: &str, cancel: &CancellationToken) -> Result<Value, ApiError> {
        self.request(Method::GET, path, None, cancel).await
    }

    pub async fn post(&self, path: &str, body: Value, cancel: &CancellationToken) -> Result<Value, ApiError> {
        self.request(Method::POST, path, Some(body), cancel).await
    }

    pub async fn put(&self, path: &str, body: Value, cancel: &CancellationToken) -> Result<Value, ApiError> {
        self.request(Method::PUT, path, Some(body), cancel).await
    }

    pub async fn delete(&self, path: &str, cancel: &CancellationToken) -> Result<Value, ApiError> {
        self.request(Method::DELETE, path, None, cancel).await
    }

    /// `GET` and decode into `T`.
    ///
    /// # Errors
    ///
    /// Propagates request errors; returns `ApiError::Decode` on a shape mismatch.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, cancel: &CancellationToken) -> Result<T, ApiError> {
        decode(self.get(path, cancel).await?)
    }
}

async fn execute(req: reqwest::RequestBuilder) -> Result<Value, ApiError> {
    let resp = req.send().await.map_err(ApiError::from_transport)?;
    let status = resp.status();

    if !status.is_success() {
        let body = resp.text().await.ok();
        return Err(http_error(status.as_u16(), body.as_deref()));
    }
    let text = resp.text().await.map_err(ApiError::from_transport)?;
    parse_body(&text)
}

/// A non-2xx answer keeps its status even when the body could not be read.
pub(crate) fn http_error(status: u16, body: Option<&str>) -> ApiError {
    ApiError::Http { status, message: error_message(status, body.unwrap_or_default()) }
}

/// Pick the backend's `message` field, falling back to `"API error: <status>"`.
pub(crate) fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("API error: {status}"))
}

pub(crate) fn parse_body(text: &str) -> Result<Value, ApiError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Decode a JSON value into a typed record.
///
/// # Errors
///
/// Returns `ApiError::Decode` when the value does not match `T`.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
