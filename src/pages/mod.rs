//! Server-rendered HTML views.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views are plain Leptos `view!` trees rendered to a string once per request;
//! nothing is hydrated. Forms post back to the dashboard's own routes and
//! every mutation answers with a redirect, so the pages carry no script.

pub mod dashboard;
pub mod error;
pub mod format;
pub mod login;

use leptos::prelude::*;
use leptos::tachys::view::RenderHtml;

const APP_CSS: &str = "
:root { font-family: system-ui, sans-serif; color: #1f2933; background: #f5f7fa; }
body { margin: 0; }
a { color: #2563eb; }
.page { max-width: 1200px; margin: 0 auto; padding: 24px; }
.header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 24px; }
.header__user { display: flex; gap: 12px; align-items: center; }
.cards { display: grid; grid-template-columns: repeat(4, 1fr); gap: 16px; margin-bottom: 24px; }
.card { background: #fff; border-radius: 8px; padding: 16px; box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1); }
.card__label { font-size: 0.85rem; color: #52606d; }
.card__value { font-size: 1.75rem; font-weight: 600; }
.tabs { display: flex; gap: 4px; border-bottom: 1px solid #cbd2d9; margin-bottom: 16px; }
.tabs a { padding: 8px 16px; text-decoration: none; border-radius: 6px 6px 0 0; }
.tabs a.tabs__active { background: #fff; border: 1px solid #cbd2d9; border-bottom-color: #fff; }
.panel { background: #fff; border-radius: 8px; padding: 16px; margin-bottom: 16px; }
table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: 8px; border-bottom: 1px solid #e4e7eb; font-size: 0.9rem; }
td.empty { text-align: center; color: #7b8794; }
form.inline { display: inline; }
.form-row { display: flex; gap: 8px; flex-wrap: wrap; align-items: end; margin-bottom: 12px; }
label { display: flex; flex-direction: column; font-size: 0.85rem; gap: 4px; }
input { padding: 6px 8px; border: 1px solid #cbd2d9; border-radius: 4px; }
button { padding: 6px 12px; border: 0; border-radius: 4px; background: #2563eb; color: #fff; cursor: pointer; }
button.secondary { background: #52606d; }
button.danger { background: #dc2626; }
.alert { background: #fde8e8; color: #9b1c1c; padding: 12px; border-radius: 6px; margin-bottom: 16px; }
.login { display: flex; justify-content: center; padding-top: 10vh; }
.login__card { background: #fff; border-radius: 8px; padding: 32px; width: 360px; box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1); }
.login__card form { display: flex; flex-direction: column; gap: 12px; }
";

/// Wrap a page body in the HTML document shell and render it.
pub fn document(title: &str, body: impl IntoView + 'static) -> String {
    let title = title.to_owned();
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <title>{title}</title>
                <style>{APP_CSS}</style>
            </head>
            <body>{body}</body>
        </html>
    }
    .to_html()
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
