//! Landed Cost Dashboard - Backend Server

use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use landed_cost_backend::{config::Config, create_app, store, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "lcd_server=debug,landed_cost_backend=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Landed Cost Dashboard Server");
    tracing::info!("Environment: {}", config.environment);

    tracing::info!("Connecting to {:?} record store...", config.store.backend);
    let store = store::connect(&config).await?;
    tracing::info!("Record store ready ({})", store.backend());

    if config.auth.users.is_empty() {
        tracing::warn!("No accounts configured under auth.users; nobody can sign in");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let app = create_app(AppState::new(store, config));

    // Start server
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
