//! Wire types for backend records.
//!
//! Field names follow the backend's camelCase JSON; identifiers arrive as
//! Mongo-style `_id` strings. Everything the dashboard only displays is
//! defaulted so a partially populated record still renders.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response envelope: the backend answers either `{ "data": T, ... }` or a
/// bare `T`, depending on endpoint version.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

// =============================================================================
// AUTH
// =============================================================================

/// Operator identity returned by `/api/auth/me` and `/api/auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub wrike_id: Option<String>,
    #[serde(default)]
    pub webwork_id: Option<i64>,
}

impl Identity {
    /// Synthetic administrator used by the demo login.
    #[must_use]
    pub fn demo_admin() -> Self {
        Self { id: None, email: "admin".to_owned(), role: Some("admin".to_owned()), wrike_id: None, webwork_id: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub user: Option<Identity>,
}

// =============================================================================
// DASHBOARD RECORDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wrike_task_id: String,
    #[serde(default)]
    pub webwork_task_id: Option<i64>,
    #[serde(default)]
    pub webwork_project_id: Option<i64>,
    #[serde(default)]
    pub webwork_user_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default)]
    pub wrike_start_date: Option<String>,
    #[serde(default)]
    pub wrike_end_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wrike_effort: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_spent: f64,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wrike_id: String,
    #[serde(default)]
    pub webwork_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLog {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wrike_api_calls: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub webwork_api_calls: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub database_api_calls: u64,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl ApiLog {
    #[must_use]
    pub fn total_calls(&self) -> u64 {
        self.wrike_api_calls
            .saturating_add(self.webwork_api_calls)
            .saturating_add(self.database_api_calls)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "null_as_default")]
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

impl Setting {
    /// Render the value as plain text (strings without quotes).
    #[must_use]
    pub fn display_value(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSize {
    pub batch_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebworkTokenExpiry {
    #[serde(default)]
    pub days_remaining: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
}

/// Body for creating or updating an integration user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub email: String,
    pub wrike_id: String,
    pub webwork_id: Option<i64>,
}

/// The two external systems whose access tokens the dashboard rotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Wrike,
    Webwork,
}

impl TokenKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wrike => "wrike",
            Self::Webwork => "webwork",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "wrike" => Some(Self::Wrike),
            "webwork" => Some(Self::Webwork),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Wrike => "Wrike",
            Self::Webwork => "Webwork",
        }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
