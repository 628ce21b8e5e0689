//! Churn Predictor - Main Entry Point

use api::{init_logging, run_server, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::load()?;
    init_logging(&config.log_level, config.log_format).map_err(|e| e as Box<dyn std::error::Error>)?;

    info!("=== Churn Predictor v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Loading model artifact from {}", config.artifact_path.display());

    run_server(config).await?;

    Ok(())
}
