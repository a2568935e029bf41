//! Standup bot server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p standup-api
//! ```
//!
//! Configuration is loaded from environment variables or a `.env` file.

use standup_common::{try_init_tracing, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load .env before tracing reads LOG_LEVEL / LOG_JSON
    let _ = dotenvy::dotenv();

    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Server failed to start");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting standup bot...");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        address = %config.server.address(),
        scheduler = config.scheduler.enabled,
        "Configuration loaded"
    );

    standup_api::run(config).await?;
    Ok(())
}
