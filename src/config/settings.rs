//! Application settings and configuration structures.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::{TripDetails, VenueLayout};

/// Longest lock lifetime accepted from configuration (one day)
pub const MAX_LOCK_TTL_SECS: u64 = 86_400;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Seat inventory dimensions
    pub venue: VenueSettings,

    /// Lock lifetime and expiry sweep cadence
    pub booking: BookingSettings,

    /// Trip metadata stamped on every booking
    pub trip: TripSettings,

    /// Snowflake ID generator settings
    pub snowflake: SnowflakeSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// WebSocket configuration
    pub websocket: WebSocketSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// Fixed seat inventory.
#[derive(Debug, Clone, Deserialize)]
pub struct VenueSettings {
    /// Number of coaches, numbered from 1
    pub coaches: u16,

    /// Seats in every coach, numbered from 1
    pub seats_per_coach: u16,
}

/// Lock policy.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingSettings {
    /// How long an unconfirmed lock lives, in seconds
    pub lock_ttl_secs: u64,

    /// How often the expiry sweep runs, in milliseconds
    pub sweep_interval_ms: u64,
}

/// Trip and fare metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct TripSettings {
    pub train_number: String,
    pub departure: String,
    pub arrival: String,
    /// Fare in whole currency units
    pub amount: u32,
    pub currency: String,
}

/// Snowflake ID generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeSettings {
    /// Machine/worker ID (0-31)
    pub machine_id: u16,

    /// Custom epoch timestamp in milliseconds
    pub epoch: u64,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// WebSocket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketSettings {
    /// Maximum message size in bytes (default: 64KB)
    pub max_message_size: usize,

    /// Maximum frame size in bytes (default: 16KB)
    pub max_frame_size: usize,

    /// Heartbeat interval in milliseconds (default: 45000)
    pub heartbeat_interval_ms: u64,

    /// Capacity of the seat update broadcast buffer
    pub event_buffer: usize,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. Built-in defaults
    /// 2. config/default.toml (base configuration)
    /// 3. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 4. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if the venue or lock policy is degenerate.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Self::defaults(environment.clone())?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__BOOKING__LOCK_TTL_SECS=60 -> booking.lock_ttl_secs = 60
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("booking.lock_ttl_secs", std::env::var("LOCK_TTL_SECS").ok())?
            .build()?
            .try_deserialize()
            .and_then(Self::validate)
    }

    /// Builder pre-populated with every default value.
    ///
    /// The defaults alone form a complete configuration, which is what
    /// tests build on.
    pub fn defaults(
        environment: String,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("environment", environment)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("venue.coaches", 6)?
            .set_default("venue.seats_per_coach", 20)?
            .set_default("booking.lock_ttl_secs", 300)?
            .set_default("booking.sweep_interval_ms", 1000)?
            .set_default("trip.train_number", "T123")?
            .set_default("trip.departure", "10:00 AM")?
            .set_default("trip.arrival", "6:00 PM")?
            .set_default("trip.amount", 50)?
            .set_default("trip.currency", "USD")?
            .set_default("snowflake.machine_id", 1)?
            .set_default("snowflake.epoch", 1704067200000_u64)?
            .set_default("cors.allowed_origins", Vec::<String>::new())?
            .set_default("websocket.max_message_size", 65536_i64)? // 64KB
            .set_default("websocket.max_frame_size", 16384_i64)? // 16KB
            .set_default("websocket.heartbeat_interval_ms", 45000_i64)?
            .set_default("websocket.event_buffer", 4096_i64)
    }

    /// Settings built from defaults only, without touching files or env.
    pub fn default_for(environment: &str) -> Result<Self, ConfigError> {
        Self::defaults(environment.to_string())?
            .build()?
            .try_deserialize()
            .and_then(Self::validate)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.venue.coaches == 0 || self.venue.seats_per_coach == 0 {
            return Err(ConfigError::Message(
                "venue must have at least one coach and one seat per coach".into(),
            ));
        }
        if self.booking.lock_ttl_secs == 0 {
            return Err(ConfigError::Message(
                "booking.lock_ttl_secs must be greater than zero".into(),
            ));
        }
        if self.booking.lock_ttl_secs > MAX_LOCK_TTL_SECS {
            return Err(ConfigError::Message(format!(
                "booking.lock_ttl_secs must not exceed {}",
                MAX_LOCK_TTL_SECS
            )));
        }
        if self.booking.sweep_interval_ms == 0 {
            return Err(ConfigError::Message(
                "booking.sweep_interval_ms must be greater than zero".into(),
            ));
        }
        if self.websocket.event_buffer == 0 {
            return Err(ConfigError::Message(
                "websocket.event_buffer must be greater than zero".into(),
            ));
        }
        Ok(self)
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl VenueSettings {
    pub fn layout(&self) -> VenueLayout {
        VenueLayout::new(self.coaches, self.seats_per_coach)
    }
}

impl BookingSettings {
    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

impl TripSettings {
    pub fn details(&self) -> TripDetails {
        TripDetails {
            train_number: self.train_number.clone(),
            departure: self.departure.clone(),
            arrival: self.arrival.clone(),
            amount: self.amount,
            currency: self.currency.clone(),
        }
    }
}
