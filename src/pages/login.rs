//! Login page.

use leptos::prelude::*;

use crate::services::session::LOGIN_PATH;

/// What the login form shows on a given render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginView {
    /// Prefill after a failed attempt.
    pub email: String,
    pub error: Option<String>,
    pub demo_enabled: bool,
}

#[component]
fn DemoLoginButton() -> impl IntoView {
    view! {
        <form method="post" action=LOGIN_PATH>
            <input type="hidden" name="mode" value="demo"/>
            <button type="submit" class="secondary">"Use Default Login (admin)"</button>
        </form>
    }
}

pub fn render(model: LoginView) -> String {
    let LoginView { email, error, demo_enabled } = model;
    super::document(
        "Sign in | Integration Dashboard",
        view! {
            <div class="login">
                <div class="login__card">
                    <h1>"Integration Dashboard"</h1>
                    <p>"Sign in to manage the Wrike and Webwork sync."</p>
                    {error.map(|message| view! { <div class="alert" role="alert">{message}</div> })}
                    <form method="post" action=LOGIN_PATH>
                        <label>
                            "Email or username"
                            <input type="text" name="email" autocomplete="username" value=email required=true/>
                        </label>
                        <label>
                            "Password"
                            <input type="password" name="password" autocomplete="current-password" required=true/>
                        </label>
                        <button type="submit">"Sign in"</button>
                    </form>
                    {demo_enabled.then(|| view! { <DemoLoginButton/> })}
                </div>
            </div>
        },
    )
}

#[cfg(test)]
#[path = "login_test.rs"]
mod tests;
