//! Court type and sport enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a court is indoors or outdoors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "court_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CourtType {
    /// Indoor court.
    Indoor,
    /// Outdoor court.
    Outdoor,
}

impl CourtType {
    /// Return the court type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indoor => "indoor",
            Self::Outdoor => "outdoor",
        }
    }
}

impl fmt::Display for CourtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CourtType {
    type Err = courtbook_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "indoor" => Ok(Self::Indoor),
            "outdoor" => Ok(Self::Outdoor),
            _ => Err(courtbook_core::AppError::validation(format!(
                "Invalid court type: '{s}'. Expected one of: indoor, outdoor"
            ))),
        }
    }
}

/// Sports a court is marked for or a coach teaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "sport", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    /// Badminton.
    Badminton,
    /// Tennis.
    Tennis,
    /// Basketball.
    Basketball,
    /// Volleyball.
    Volleyball,
}

impl Sport {
    /// Return the sport as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Badminton => "badminton",
            Self::Tennis => "tennis",
            Self::Basketball => "basketball",
            Self::Volleyball => "volleyball",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Sport {
    type Err = courtbook_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "badminton" => Ok(Self::Badminton),
            "tennis" => Ok(Self::Tennis),
            "basketball" => Ok(Self::Basketball),
            "volleyball" => Ok(Self::Volleyball),
            _ => Err(courtbook_core::AppError::validation(format!(
                "Invalid sport: '{s}'. Expected one of: badminton, tennis, basketball, volleyball"
            ))),
        }
    }
}
