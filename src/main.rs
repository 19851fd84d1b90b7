mod api;
mod config;
mod pages;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::DashboardConfig::from_env().expect("invalid configuration");
    if config.demo_mode.is_enabled() {
        tracing::warn!("demo mode enabled: the admin/admin login bypasses the backend");
    }
    let port = config.port;
    let base_url = config.api_base_url.clone();

    let state = state::AppState::new(config).expect("api client init failed");
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, %base_url, "integration dashboard listening");
    axum::serve(listener, app).await.expect("server failed");
}
