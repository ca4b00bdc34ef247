//! Booking engine configuration: operating window, slot width, facility
//! timezone, and admission limits.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::AppError;
use crate::result::AppResult;

/// Configuration for availability, slot enumeration, and admission.
///
/// All wall-clock decisions (peak hours, weekdays, operating window, and
/// calendar days) are evaluated at the facility's fixed UTC offset.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[validate(schema(function = "validate_window"))]
pub struct BookingConfig {
    /// First bookable hour of the day (inclusive).
    #[serde(default = "default_opening_hour")]
    #[validate(range(max = 23))]
    pub opening_hour: u32,

    /// Hour at which the last slot ends (exclusive upper bound).
    #[serde(default = "default_closing_hour")]
    #[validate(range(min = 1, max = 24))]
    pub closing_hour: u32,

    /// Width of each enumerated slot in minutes.
    #[serde(default = "default_slot_minutes")]
    #[validate(range(min = 5, max = 1440))]
    pub slot_minutes: u32,

    /// Facility offset from UTC in minutes (e.g. `330` for UTC+05:30).
    #[serde(default)]
    #[validate(range(min = -1439, max = 1439))]
    pub utc_offset_minutes: i32,

    /// Upper bound on a single check-then-write admission.
    #[serde(default = "default_admission_timeout_ms")]
    #[validate(range(min = 10, max = 60000))]
    pub admission_timeout_ms: u64,

    /// Interval between periodic stock reconciliation passes.
    #[serde(default = "default_reconcile_interval")]
    #[validate(range(min = 1))]
    pub reconcile_interval_seconds: u64,
}

impl BookingConfig {
    /// The facility's timezone as a fixed offset.
    pub fn timezone(&self) -> AppResult<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            AppError::configuration(format!(
                "Invalid UTC offset: {} minutes",
                self.utc_offset_minutes
            ))
        })
    }

    /// Admission timeout as a [`std::time::Duration`].
    pub fn admission_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.admission_timeout_ms)
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            opening_hour: default_opening_hour(),
            closing_hour: default_closing_hour(),
            slot_minutes: default_slot_minutes(),
            utc_offset_minutes: 0,
            admission_timeout_ms: default_admission_timeout_ms(),
            reconcile_interval_seconds: default_reconcile_interval(),
        }
    }
}

fn validate_window(config: &BookingConfig) -> Result<(), ValidationError> {
    if config.opening_hour >= config.closing_hour {
        return Err(ValidationError::new("opening_hour_after_closing_hour"));
    }
    Ok(())
}

fn default_opening_hour() -> u32 {
    6
}

fn default_closing_hour() -> u32 {
    22
}

fn default_slot_minutes() -> u32 {
    60
}

fn default_admission_timeout_ms() -> u64 {
    5000
}

fn default_reconcile_interval() -> u64 {
    300
}
