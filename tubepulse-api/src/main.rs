use tracing::info;
use tracing_subscriber::EnvFilter;
use tubepulse_api::api::start_server;
use tubepulse_api::config::ApiConfig;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ApiConfig::from_env();
    info!("Starting TubePulse API server on {}", config.bind_address);

    start_server(config).await
}
