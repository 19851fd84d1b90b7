//! Dashboard records: typed list fetches and mutations on top of `ApiClient`.
//!
//! Records are read-only projections fetched per page load; nothing here is
//! cached across navigations.

use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use crate::api::types::{
    AccessToken, ApiLog, BatchSize, Envelope, Setting, Task, TokenKind, User, UserInput, WebworkTokenExpiry,
};
use crate::api::{ApiClient, ApiError, decode};

pub const TASKS_ENDPOINT: &str = "/api/tasks";
pub const USERS_ENDPOINT: &str = "/api/users";
pub const API_LOGS_ENDPOINT: &str = "/api/api-logs";
pub const SETTINGS_ENDPOINT: &str = "/api/settings";
pub const BATCH_SIZE_ENDPOINT: &str = "/api/settings/batch-size";
pub const WEBWORK_EXPIRY_ENDPOINT: &str = "/api/tokens/webwork/expiry";

/// Everything the summary cards and the four tables need.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardData {
    pub tasks: Vec<Task>,
    pub users: Vec<User>,
    pub api_logs: Vec<ApiLog>,
    pub settings: Vec<Setting>,
}

/// Extra state shown only on the settings tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPanel {
    pub batch_size: BatchSize,
    pub wrike_token: AccessToken,
    pub webwork_token: AccessToken,
    pub webwork_expiry: WebworkTokenExpiry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_tasks: usize,
    pub total_users: usize,
    /// Percentage of tasks with a positive Wrike effort, rounded.
    pub completion_rate: usize,
    pub total_api_calls: u64,
}

#[must_use]
pub fn dashboard_stats(data: &DashboardData) -> DashboardStats {
    let total_tasks = data.tasks.len();
    let with_effort = data
        .tasks
        .iter()
        .filter(|t| t.wrike_effort > 0.0)
        .count();
    let completion_rate = if total_tasks == 0 { 0 } else { (with_effort * 100 + total_tasks / 2) / total_tasks };

    DashboardStats {
        total_tasks,
        total_users: data.users.len(),
        completion_rate,
        total_api_calls: data
            .api_logs
            .iter()
            .map(ApiLog::total_calls)
            .fold(0, u64::saturating_add),
    }
}

/// True when the body holds a `batchSize` either at the top level or under `data`.
fn carries_batch_size(raw: &Value) -> bool {
    raw.get("batchSize").is_some() || raw.get("data").is_some_and(|d| d.get("batchSize").is_some())
}

pub(crate) fn user_path(id: &str) -> String {
    format!("{USERS_ENDPOINT}/{id}")
}

pub(crate) fn task_path(id: &str) -> String {
    format!("{TASKS_ENDPOINT}/{id}")
}

pub(crate) fn token_path(kind: TokenKind) -> String {
    format!("/api/tokens/{}", kind.as_str())
}

/// Typed access to the backend's dashboard endpoints.
///
/// Expects an `ApiClient` already bound to the operator's bearer token.
pub struct RecordsService {
    api: ApiClient,
}

impl RecordsService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn list<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>, ApiError> {
        self.api
            .get_json::<Envelope<Vec<T>>>(path, cancel)
            .await
            .map(Envelope::into_inner)
    }

    async fn single<T: serde::de::DeserializeOwned>(&self, path: &str, cancel: &CancellationToken) -> Result<T, ApiError> {
        self.api
            .get_json::<Envelope<T>>(path, cancel)
            .await
            .map(Envelope::into_inner)
    }

    pub async fn tasks(&self, cancel: &CancellationToken) -> Result<Vec<Task>, ApiError> {
        self.list(TASKS_ENDPOINT, cancel).await
    }

    pub async fn users(&self, cancel: &CancellationToken) -> Result<Vec<User>, ApiError> {
        self.list(USERS_ENDPOINT, cancel).await
    }

    pub async fn api_logs(&self, cancel: &CancellationToken) -> Result<Vec<ApiLog>, ApiError> {
        self.list(API_LOGS_ENDPOINT, cancel).await
    }

    pub async fn settings(&self, cancel: &CancellationToken) -> Result<Vec<Setting>, ApiError> {
        self.list(SETTINGS_ENDPOINT, cancel).await
    }

    /// Fetch the four record lists in parallel; the first failure wins.
    ///
    /// # Errors
    ///
    /// Returns the first `ApiError` produced by any of the list fetches.
    pub async fn dashboard(&self, cancel: &CancellationToken) -> Result<DashboardData, ApiError> {
        let (tasks, users, api_logs, settings) = tokio::try_join!(
            self.tasks(cancel),
            self.users(cancel),
            self.api_logs(cancel),
            self.settings(cancel),
        )?;
        Ok(DashboardData { tasks, users, api_logs, settings })
    }

    pub async fn batch_size(&self, cancel: &CancellationToken) -> Result<BatchSize, ApiError> {
        self.single(BATCH_SIZE_ENDPOINT, cancel).await
    }

    pub async fn access_token(&self, kind: TokenKind, cancel: &CancellationToken) -> Result<AccessToken, ApiError> {
        self.single(&token_path(kind), cancel).await
    }

    pub async fn webwork_expiry(&self, cancel: &CancellationToken) -> Result<WebworkTokenExpiry, ApiError> {
        self.single(WEBWORK_EXPIRY_ENDPOINT, cancel).await
    }

    /// # Errors
    ///
    /// Returns the first `ApiError` produced by any of the settings fetches.
    pub async fn settings_panel(&self, cancel: &CancellationToken) -> Result<SettingsPanel, ApiError> {
        let (batch_size, wrike_token, webwork_token, webwork_expiry) = tokio::try_join!(
            self.batch_size(cancel),
            self.access_token(TokenKind::Wrike, cancel),
            self.access_token(TokenKind::Webwork, cancel),
            self.webwork_expiry(cancel),
        )?;
        Ok(SettingsPanel { batch_size, wrike_token, webwork_token, webwork_expiry })
    }

    pub async fn create_user(&self, input: &UserInput, cancel: &CancellationToken) -> Result<(), ApiError> {
        let body = serde_json::to_value(input).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.api.post(USERS_ENDPOINT, body, cancel).await?;
        Ok(())
    }

    pub async fn update_user(&self, id: &str, input: &UserInput, cancel: &CancellationToken) -> Result<(), ApiError> {
        let body = serde_json::to_value(input).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.api.put(&user_path(id), body, cancel).await?;
        Ok(())
    }

    pub async fn delete_user(&self, id: &str, cancel: &CancellationToken) -> Result<(), ApiError> {
        self.api.delete(&user_path(id), cancel).await?;
        Ok(())
    }

    pub async fn delete_task(&self, id: &str, cancel: &CancellationToken) -> Result<(), ApiError> {
        self.api.delete(&task_path(id), cancel).await?;
        Ok(())
    }

    /// Update the sync batch size and return the value the backend stored.
    pub async fn set_batch_size(&self, batch_size: u32, cancel: &CancellationToken) -> Result<BatchSize, ApiError> {
        let raw = self
            .api
            .put(BATCH_SIZE_ENDPOINT, json!({ "batchSize": batch_size }), cancel)
            .await?;
        // Some backend versions answer with a bare `{success:true}`.
        if !carries_batch_size(&raw) {
            return Ok(BatchSize { batch_size });
        }
        decode::<Envelope<BatchSize>>(raw)
            .map(Envelope::into_inner)
            .inspect_err(|e| tracing::warn!(error = %e, "batch size response did not decode"))
    }

    pub async fn set_access_token(&self, kind: TokenKind, token: &str, cancel: &CancellationToken) -> Result<(), ApiError> {
        self.api
            .put(&token_path(kind), json!({ "token": token }), cancel)
            .await?;
        tracing::info!(kind = kind.as_str(), "access token rotated");
        Ok(())
    }
}

#[cfg(test)]
#[path = "records_test.rs"]
mod tests;
