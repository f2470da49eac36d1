//! # Studio API
//!
//! Entry point: logging, configuration, then the HTTP server.

use anyhow::Result;
use tracing::info;

use studio_api::config::Settings;
use studio_api::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    studio_api::telemetry::init_tracing();

    info!("Starting Studio API...");

    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        cache = ?settings.cache.backend,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!(addr = ?application.local_addr()?, "Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
