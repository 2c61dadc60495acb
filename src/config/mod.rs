//! # Configuration Module
//!
//! This module handles application configuration loading and management.
//! Configuration can be loaded from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{environment}.toml)
//! - .env files (via dotenvy)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use train_booking::config::Settings;
//!
//! let settings = Settings::load()?;
//! println!("Lock TTL is {}s", settings.booking.lock_ttl_secs);
//! ```

mod settings;

pub use settings::*;
