//! Admin dashboard page: summary cards, tab strip and one table per tab.
//!
//! DESIGN
//! ======
//! The page is a pure function of what the route handler fetched. Tables
//! render exactly the records they are given; an empty list becomes a single
//! "No records" row so an empty table is never mistaken for a broken one.

use leptos::prelude::*;

use super::format::{format_date, format_datetime, format_optional_id, mask_secret};
use crate::api::types::{AccessToken, ApiLog, Identity, Setting, Task, TokenKind, User, WebworkTokenExpiry};
use crate::services::records::{DashboardData, DashboardStats, SettingsPanel, dashboard_stats};

pub const EMPTY_ROW_TEXT: &str = "No records";

// =============================================================================
// TABS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Tasks,
    Users,
    ApiLogs,
    Settings,
}

impl Tab {
    pub const ALL: [Self; 4] = [Self::Tasks, Self::Users, Self::ApiLogs, Self::Settings];

    /// Unknown or missing values fall back to the tasks tab.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("users") => Self::Users,
            Some("api-logs") => Self::ApiLogs,
            Some("settings") => Self::Settings,
            _ => Self::Tasks,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Users => "users",
            Self::ApiLogs => "api-logs",
            Self::Settings => "settings",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Tasks => "Tasks",
            Self::Users => "Users",
            Self::ApiLogs => "API Logs",
            Self::Settings => "Settings",
        }
    }

    #[must_use]
    pub fn href(self) -> String {
        format!("/?tab={}", self.as_str())
    }
}

// =============================================================================
// VIEW MODEL
// =============================================================================

pub struct DashboardView {
    pub operator: Identity,
    pub tab: Tab,
    pub data: DashboardData,
    /// Only fetched for the settings tab.
    pub settings: Option<SettingsPanel>,
    /// Id of the user whose edit form is open.
    pub editing: Option<String>,
}

pub(crate) fn expiry_summary(expiry: &WebworkTokenExpiry) -> String {
    let mut parts = Vec::new();
    match expiry.days_remaining {
        Some(days) if days < 0 => parts.push("Expired".to_owned()),
        Some(1) => parts.push("1 day remaining".to_owned()),
        Some(days) => parts.push(format!("{days} days remaining")),
        None => parts.push("Expiry unknown".to_owned()),
    }
    if expiry.expiry_date.is_some() {
        parts.push(format!("expires {}", format_date(expiry.expiry_date.as_deref())));
    }
    if expiry.updated_at.is_some() {
        parts.push(format!("last updated {}", format_datetime(expiry.updated_at.as_deref())));
    }
    parts.join(", ")
}

fn rows_or_empty<T, V>(items: Vec<T>, columns: usize, row: impl Fn(T) -> V) -> AnyView
where
    V: IntoView + 'static,
{
    if items.is_empty() {
        view! {
            <tr>
                <td class="empty" colspan=columns.to_string()>{EMPTY_ROW_TEXT}</td>
            </tr>
        }
        .into_any()
    } else {
        items.into_iter().map(row).collect_view().into_any()
    }
}

// =============================================================================
// COMPONENTS
// =============================================================================

#[component]
fn StatCard(label: &'static str, value: String) -> impl IntoView {
    view! {
        <div class="card">
            <div class="card__label">{label}</div>
            <div class="card__value">{value}</div>
        </div>
    }
}

#[component]
fn DeleteButton(action: String) -> impl IntoView {
    view! {
        <form class="inline" method="post" action=action>
            <button type="submit" class="danger">"Delete"</button>
        </form>
    }
}

fn stat_cards(stats: DashboardStats) -> impl IntoView {
    view! {
        <section class="cards">
            <StatCard label="Total Tasks" value=stats.total_tasks.to_string()/>
            <StatCard label="Total Users" value=stats.total_users.to_string()/>
            <StatCard label="Completion Rate" value=format!("{}%", stats.completion_rate)/>
            <StatCard label="Total API Calls" value=stats.total_api_calls.to_string()/>
        </section>
    }
}

fn tab_strip(active: Tab) -> impl IntoView {
    let links = Tab::ALL
        .into_iter()
        .map(|tab| {
            let is_active = tab == active;
            view! { <a href=tab.href() class:tabs__active=is_active>{tab.label()}</a> }
        })
        .collect_view();
    view! { <nav class="tabs">{links}</nav> }
}

fn tasks_table(tasks: Vec<Task>) -> impl IntoView {
    let rows = rows_or_empty(tasks, 9, |task| {
        view! {
            <tr>
                <td>{task.wrike_task_id}</td>
                <td>{task.email}</td>
                <td>{format_optional_id(task.webwork_task_id)}</td>
                <td>{format_optional_id(task.webwork_project_id)}</td>
                <td>{format_date(task.wrike_start_date.as_deref())}</td>
                <td>{format_date(task.wrike_end_date.as_deref())}</td>
                <td>{task.wrike_effort.to_string()}</td>
                <td>{task.time_spent.to_string()}</td>
                <td><DeleteButton action=format!("/tasks/{}/delete", task.id)/></td>
            </tr>
        }
    });
    view! {
        <div class="panel">
            <table>
                <thead>
                    <tr>
                        <th>"Wrike Task"</th>
                        <th>"Email"</th>
                        <th>"Webwork Task"</th>
                        <th>"Webwork Project"</th>
                        <th>"Start"</th>
                        <th>"End"</th>
                        <th>"Effort (h)"</th>
                        <th>"Time Spent (h)"</th>
                        <th>"Actions"</th>
                    </tr>
                </thead>
                <tbody>{rows}</tbody>
            </table>
        </div>
    }
}

fn user_form(editing: Option<User>) -> impl IntoView {
    let is_edit = editing.is_some();
    let (action, email, wrike_id, webwork_id) = match editing {
        Some(user) => (format!("/users/{}", user.id), user.email, user.wrike_id, format_optional_id(user.webwork_id)),
        None => ("/users".to_owned(), String::new(), String::new(), String::new()),
    };
    let heading = if is_edit { "Edit user" } else { "Add user" };
    let submit = if is_edit { "Save changes" } else { "Add user" };
    let cancel = is_edit.then(|| view! { <a href=Tab::Users.href()>"Cancel"</a> });
    view! {
        <div class="panel">
            <h3>{heading}</h3>
            <form method="post" action=action class="form-row">
                <label>"Email" <input type="email" name="email" value=email required=true/></label>
                <label>"Wrike ID" <input type="text" name="wrike_id" value=wrike_id required=true/></label>
                <label>"Webwork ID" <input type="number" name="webwork_id" value=webwork_id/></label>
                <button type="submit">{submit}</button>
                {cancel}
            </form>
        </div>
    }
}

fn users_table(users: Vec<User>, editing: Option<&str>) -> impl IntoView {
    let edited = editing.and_then(|id| users.iter().find(|u| u.id == id).cloned());
    let rows = rows_or_empty(users, 5, |user| {
        let edit_href = format!("{}&edit={}", Tab::Users.href(), user.id);
        view! {
            <tr>
                <td>{user.email}</td>
                <td>{user.wrike_id}</td>
                <td>{format_optional_id(user.webwork_id)}</td>
                <td>{format_date(user.created_at.as_deref())}</td>
                <td>
                    <a href=edit_href>"Edit"</a>
                    " "
                    <DeleteButton action=format!("/users/{}/delete", user.id)/>
                </td>
            </tr>
        }
    });
    view! {
        {user_form(edited)}
        <div class="panel">
            <table>
                <thead>
                    <tr>
                        <th>"Email"</th>
                        <th>"Wrike ID"</th>
                        <th>"Webwork ID"</th>
                        <th>"Created"</th>
                        <th>"Actions"</th>
                    </tr>
                </thead>
                <tbody>{rows}</tbody>
            </table>
        </div>
    }
}

fn api_logs_table(logs: Vec<ApiLog>) -> impl IntoView {
    let rows = rows_or_empty(logs, 5, |log| {
        let total = log.total_calls();
        view! {
            <tr>
                <td>{format_datetime(log.timestamp.as_deref())}</td>
                <td>{log.wrike_api_calls.to_string()}</td>
                <td>{log.webwork_api_calls.to_string()}</td>
                <td>{log.database_api_calls.to_string()}</td>
                <td>{total.to_string()}</td>
            </tr>
        }
    });
    view! {
        <div class="panel">
            <table>
                <thead>
                    <tr>
                        <th>"Timestamp"</th>
                        <th>"Wrike Calls"</th>
                        <th>"Webwork Calls"</th>
                        <th>"Database Calls"</th>
                        <th>"Total"</th>
                    </tr>
                </thead>
                <tbody>{rows}</tbody>
            </table>
        </div>
    }
}

fn token_form(kind: TokenKind, current: AccessToken) -> impl IntoView {
    let heading = format!("{} access token", kind.label());
    let action = format!("/tokens/{}", kind.as_str());
    let masked = mask_secret(current.token.as_deref());
    view! {
        <div class="panel">
            <h3>{heading}</h3>
            <p>"Current: " {masked}</p>
            <form method="post" action=action class="form-row">
                <label>"New token" <input type="password" name="token" autocomplete="off" required=true/></label>
                <button type="submit">"Update"</button>
            </form>
        </div>
    }
}

fn settings_panel(panel: SettingsPanel) -> impl IntoView {
    let SettingsPanel { batch_size, wrike_token, webwork_token, webwork_expiry } = panel;
    view! {
        <div class="panel">
            <h3>"Sync batch size"</h3>
            <form method="post" action="/settings/batch-size" class="form-row">
                <label>
                    "Tasks per batch"
                    <input type="number" name="batch_size" min="1" value=batch_size.batch_size.to_string() required=true/>
                </label>
                <button type="submit">"Save"</button>
            </form>
        </div>
        {token_form(TokenKind::Wrike, wrike_token)}
        {token_form(TokenKind::Webwork, webwork_token)}
        <div class="panel">
            <h3>"Webwork token expiry"</h3>
            <p>{expiry_summary(&webwork_expiry)}</p>
        </div>
    }
}

fn settings_table(settings: Vec<Setting>, panel: Option<SettingsPanel>) -> impl IntoView {
    let rows = rows_or_empty(settings, 2, |setting| {
        let value = setting.display_value();
        view! {
            <tr>
                <td>{setting.key}</td>
                <td>{value}</td>
            </tr>
        }
    });
    view! {
        {panel.map(settings_panel)}
        <div class="panel">
            <table>
                <thead>
                    <tr>
                        <th>"Key"</th>
                        <th>"Value"</th>
                    </tr>
                </thead>
                <tbody>{rows}</tbody>
            </table>
        </div>
    }
}

// =============================================================================
// PAGE
// =============================================================================

pub fn render(model: DashboardView) -> String {
    let DashboardView { operator, tab, data, settings, editing } = model;
    let stats = dashboard_stats(&data);
    let DashboardData { tasks, users, api_logs, settings: setting_rows } = data;

    let body = match tab {
        Tab::Tasks => tasks_table(tasks).into_any(),
        Tab::Users => users_table(users, editing.as_deref()).into_any(),
        Tab::ApiLogs => api_logs_table(api_logs).into_any(),
        Tab::Settings => settings_table(setting_rows, settings).into_any(),
    };

    super::document(
        "Admin Dashboard",
        view! {
            <main class="page">
                <header class="header">
                    <h1>"Admin Dashboard"</h1>
                    <div class="header__user">
                        <span>{operator.email}</span>
                        <form class="inline" method="post" action="/logout">
                            <button type="submit" class="secondary">"Logout"</button>
                        </form>
                    </div>
                </header>
                {stat_cards(stats)}
                {tab_strip(tab)}
                {body}
            </main>
        },
    )
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
