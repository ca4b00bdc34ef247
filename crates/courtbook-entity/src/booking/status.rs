//! Booking status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a booking. Only confirmed bookings count toward
/// conflict detection and stock consumption.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Holds its resources.
    #[default]
    Confirmed,
    /// Released its resources.
    Cancelled,
    /// Waiting; holds nothing.
    Waitlist,
}

impl BookingStatus {
    /// Whether the booking holds its court, coach, and equipment.
    pub fn holds_resources(&self) -> bool {
        matches!(self, Self::Confirmed)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Waitlist => "waitlist",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = courtbook_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "waitlist" => Ok(Self::Waitlist),
            _ => Err(courtbook_core::AppError::validation(format!(
                "Invalid booking status: '{s}'. Expected one of: confirmed, cancelled, waitlist"
            ))),
        }
    }
}
