use gateway::config::GatewayConfig;
use gateway::router::create_router;
use gateway::state::AppState;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting Gateway API service");

    let config = GatewayConfig::from_env()?;
    if config.uses_default_api_key() {
        tracing::warn!("API_KEYS contains the built-in default key; set API_KEYS for production");
    }
    if config.uses_default_admin_key() {
        tracing::warn!("ADMIN_KEY is the built-in default; set ADMIN_KEY for production");
    }
    tracing::info!(data_dir = %config.data_dir.display(), "serving tick archive");

    // Initialize application state
    let state = AppState::from_config(&config);

    // Create router
    let app = create_router(state);

    // Bind and serve
    let listener = TcpListener::bind(config.bind_addr).await?;

    tracing::info!("Listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
