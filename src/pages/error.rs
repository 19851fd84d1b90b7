use leptos::prelude::*;

/// Page-level error with a link back to where the operator came from.
pub fn render(message: &str, back_href: &str) -> String {
    let message = message.to_owned();
    let back_href = back_href.to_owned();
    super::document(
        "Error | Integration Dashboard",
        view! {
            <main class="page">
                <div class="alert" role="alert">
                    <h2>"Something went wrong"</h2>
                    <p>{message}</p>
                </div>
                <a href=back_href>"Back to dashboard"</a>
            </main>
        },
    )
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
