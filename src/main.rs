use sqlx::mysql::MySqlPoolOptions;

use support_api::config;
use support_api::realtime::Broadcaster;
use support_api::services::client::ServiceClient;
use support_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting support-api in {:?} mode", config.environment);

    // Lazy pool: connections open on first query, so the service comes up
    // even when the database is briefly unavailable.
    let pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_lazy(&config.database.url)
        .unwrap_or_else(|e| panic!("invalid DATABASE_URL: {}", e));

    let services = ServiceClient::new(
        config.services.retry_attempts,
        config.services.retry_base_delay_ms,
    );
    let broadcaster = Broadcaster::new(256);

    let app = support_api::app(AppState::new(pool, services, broadcaster));

    let port = std::env::var("SUPPORT_SERVICE_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(4005);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("support-api listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
