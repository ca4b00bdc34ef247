//! `HH:mm` wall-clock time used by peak-hour windows.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use courtbook_core::error::AppError;

/// A time of day in 24-hour `HH:mm` form (`H:mm` is also accepted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Build a clock time, rejecting out-of-range components.
    pub fn new(hour: u8, minute: u8) -> Result<Self, AppError> {
        if hour > 23 || minute > 59 {
            return Err(AppError::validation(format!(
                "Invalid time {hour}:{minute:02}; expected HH:mm"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Hour component (0-23).
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute component (0-59).
    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl FromStr for ClockTime {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::validation(format!("Time must be in HH:mm format, got '{s}'"));
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for ClockTime {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let t: ClockTime = "18:00".parse().unwrap();
        assert_eq!((t.hour(), t.minute()), (18, 0));
        let t: ClockTime = "7:30".parse().unwrap();
        assert_eq!(t.to_string(), "07:30");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["24:00", "12:60", "1200", "12:5", ":30", "ab:cd", "123:00"] {
            assert!(bad.parse::<ClockTime>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_serde_as_string() {
        let t = ClockTime::new(21, 0).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"21:00\"");
        let parsed: ClockTime = serde_json::from_str("\"06:15\"").unwrap();
        assert_eq!(parsed, ClockTime::new(6, 15).unwrap());
    }
}
