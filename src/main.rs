//! # Portfolio Admin
//!
//! Entry point of the portfolio administration backend.
//!
//! Initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Document store (PostgreSQL or in-memory)
//! - HTTP server

use anyhow::Result;
use tracing::info;

use portfolio_admin::config::Settings;
use portfolio_admin::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    portfolio_admin::telemetry::init_tracing();

    info!("Starting Portfolio Admin...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        memory_store = settings.uses_memory_store(),
        "Configuration loaded"
    );

    // Build and run the application
    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
