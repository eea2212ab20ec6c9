mod config;
mod main_lib;

use config::Config;
use main_lib::{build_state, init_tracing, log_overview, spawn_snapshot_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    init_tracing(&config.log_format);
    tracing::info!("Watching {} (push channel {})", config.api_url, config.ws_url);

    let state = build_state(&config).await?;
    let logger = spawn_snapshot_logger(&state.synchronizer);
    log_overview(&state.gateway).await;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    state.shutdown();
    logger.await?;
    Ok(())
}
