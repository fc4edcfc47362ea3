use anyhow::Result;
use text_analyzer::config::Config;
use text_analyzer::server::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("text_analyzer={},tower_http=debug", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting text analyzer service");
    tracing::info!(
        "Configuration: bind_addr={}, table_name={}, route_prefix={:?}, store_configured={}",
        config.bind_addr,
        config.table_name,
        config.route_prefix,
        config.store_settings().is_some()
    );

    Server::new(&config)
        .await
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
