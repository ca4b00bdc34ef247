//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod booking;
pub mod database;
pub mod logging;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use self::booking::BookingConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::{LogFormat, LoggingConfig};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Availability, slot, and admission settings.
    #[serde(default)]
    pub booking: BookingConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file is optional; environment variables prefixed with
    /// `COURTBOOK__` (e.g. `COURTBOOK__DATABASE__URL`) override its values.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("COURTBOOK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config
            .database
            .validate()
            .map_err(|e| AppError::configuration(format!("Invalid database config: {e}")))?;
        config
            .booking
            .validate()
            .map_err(|e| AppError::configuration(format!("Invalid booking config: {e}")))?;
        config.booking.timezone()?;

        Ok(config)
    }
}
