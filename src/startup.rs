//! Application Startup
//!
//! Wires the seat registry, lock manager, booking coordinator and gateway
//! together and runs the HTTP/WebSocket server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::compression::CompressionLayer;

use crate::application::services::{spawn_expiry_worker, BookingCoordinator, LockManager};
use crate::config::Settings;
use crate::domain::{BookingRepository, SeatRegistry};
use crate::infrastructure::repositories::InMemoryBookingRepository;
use crate::presentation::http::{handlers, routes};
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::gateway::Gateway;
use crate::shared::snowflake::SnowflakeGenerator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SeatRegistry>,
    pub locks: Arc<LockManager>,
    pub bookings: Arc<BookingCoordinator>,
    pub gateway: Arc<Gateway>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Build the in-memory core from settings.
    pub fn new(settings: Settings) -> Self {
        Self::with_repository(settings, Arc::new(InMemoryBookingRepository::new()))
    }

    /// Same as [`AppState::new`] with a caller-supplied booking store.
    pub fn with_repository(settings: Settings, repository: Arc<dyn BookingRepository>) -> Self {
        let gateway = Arc::new(Gateway::new(&settings.websocket));

        let layout = settings.venue.layout();
        let registry = Arc::new(SeatRegistry::new(layout, gateway.clone()));
        tracing::info!(
            coaches = layout.coaches,
            seats_per_coach = layout.seats_per_coach,
            "Seat registry initialized"
        );

        let locks = Arc::new(LockManager::new(
            registry.clone(),
            settings.booking.lock_ttl(),
        ));

        let ids = Arc::new(SnowflakeGenerator::new(
            settings.snowflake.epoch,
            settings.snowflake.machine_id as u64,
            0u64, // Default node_id
        ));

        let bookings = Arc::new(BookingCoordinator::new(
            locks.clone(),
            repository,
            ids,
            settings.trip.details(),
        ));

        Self {
            registry,
            locks,
            bookings,
            gateway,
            settings: Arc::new(settings),
        }
    }
}

/// Router with every layer applied, without binding a socket.
pub fn build_router(state: AppState) -> Router {
    let cors = cors::create_cors_layer(&state.settings.cors);
    routes::create_router(state)
        .layer(CompressionLayer::new())
        .layer(logging::create_trace_layer())
        .layer(cors)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    state: AppState,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        handlers::health::init_server_start();

        let addr = settings.server_addr();
        let state = AppState::new(settings);
        let router = build_router(state.clone());

        // Bind to address
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            router,
            state,
        })
    }

    /// Run the server until Ctrl-C, then stop the expiry worker.
    pub async fn run_until_stopped(self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = spawn_expiry_worker(
            self.state.locks.clone(),
            self.state.settings.booking.sweep_interval(),
            shutdown_rx,
        );

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        let _ = shutdown_tx.send(true);
        if let Err(e) = worker.await {
            tracing::error!(error = %e, "Expiry worker panicked");
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
