use cei_portal::config::PortalConfig;
use cei_portal::{routes, state};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = PortalConfig::from_env().expect("invalid configuration");
    let port = config.port;
    tracing::info!(
        api_base_url = %config.api_base_url,
        environment = ?config.environment,
        "configuration loaded"
    );

    let state = state::AppState::new(config).expect("backend client init failed");

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "cei-portal listening");
    axum::serve(listener, app).await.expect("server failed");
}
