//! Database configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// PostgreSQL pool settings. The booking ledger holds one connection per
/// in-flight admission, so `max_connections` bounds concurrent writes.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[validate(schema(function = "validate_pool_bounds"))]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    #[validate(length(min = 1))]
    pub url: String,
    /// Pool ceiling.
    #[serde(default = "default_max_connections")]
    #[validate(range(min = 1))]
    pub max_connections: u32,
    /// Connections kept open while idle.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// How long to wait for a pooled connection, in seconds.
    #[serde(default = "default_acquire_timeout")]
    #[validate(range(min = 1))]
    pub acquire_timeout_seconds: u64,
    /// Idle connections are closed after this many seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl DatabaseConfig {
    /// Acquire timeout as a [`Duration`].
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }

    /// Idle timeout as a [`Duration`].
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }
}

fn validate_pool_bounds(config: &DatabaseConfig) -> Result<(), ValidationError> {
    if config.min_connections > config.max_connections {
        return Err(ValidationError::new("min_connections_exceeds_max"));
    }
    Ok(())
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}
