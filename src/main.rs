//! # Train Booking Server
//!
//! Real-time seat selection and booking for a single train trip.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Seat registry, lock manager and booking coordinator
//! - HTTP/WebSocket server and the lock expiry worker

use anyhow::Result;
use tracing::info;

use train_booking::config::Settings;
use train_booking::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    train_booking::telemetry::init_tracing();

    info!("Starting Train Booking Server...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        lock_ttl_secs = settings.booking.lock_ttl_secs,
        "Configuration loaded"
    );

    // Build and run the application
    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
