//! Unified application error types for Courtbook.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Resource unavailability is *not* an
//! error during an availability check; it only becomes a [`ErrorKind::Conflict`]
//! when a booking admission is refused, in which case the itemized
//! [`AvailabilityResult`] travels with the error.

use std::fmt;
use thiserror::Error;
use tracing::error;

use crate::types::availability::AvailabilityResult;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The referenced court, coach, equipment, booking, or rule does not exist.
    NotFound,
    /// A required field is missing or malformed.
    Validation,
    /// An interval whose end is not strictly after its start.
    InvalidInterval,
    /// A requested resource is unavailable for the interval.
    Conflict,
    /// The booking has already been cancelled.
    AlreadyCancelled,
    /// An internal error occurred.
    Internal,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// The operation could not complete in time.
    ServiceUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::InvalidInterval => write!(f, "INVALID_INTERVAL"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::AlreadyCancelled => write!(f, "ALREADY_CANCELLED"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::ServiceUnavailable => write!(f, "SERVICE_UNAVAILABLE"),
        }
    }
}

/// The unified application error used throughout Courtbook.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Itemized availability for a refused admission.
    pub availability: Option<Box<AvailabilityResult>>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            availability: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            availability: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create an invalid-interval error.
    pub fn invalid_interval(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInterval, message)
    }

    /// Create a conflict error without an availability payload.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a conflict error carrying the availability result that refused
    /// the admission.
    pub fn unavailable(result: AvailabilityResult) -> Self {
        Self {
            kind: ErrorKind::Conflict,
            message: "Requested resources are not available".to_string(),
            availability: Some(Box::new(result)),
            source: None,
        }
    }

    /// Create an already-cancelled error.
    pub fn already_cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyCancelled, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a service-unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    /// Whether this error was caused by the caller's request rather than by
    /// the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::NotFound
                | ErrorKind::Validation
                | ErrorKind::InvalidInterval
                | ErrorKind::Conflict
                | ErrorKind::AlreadyCancelled
        )
    }

    /// Collapse store and internal failures into a generic error suitable for
    /// callers. The original error is logged before it is discarded; client
    /// errors pass through unchanged.
    pub fn sanitized(self) -> Self {
        match self.kind {
            ErrorKind::Database | ErrorKind::Internal | ErrorKind::Serialization => {
                error!(kind = %self.kind, error = %self.message, "Internal failure");
                Self::internal("An internal error occurred")
            }
            _ => self,
        }
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            availability: self.availability.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::with_source(ErrorKind::Validation, format!("Invalid input: {err}"), err)
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::with_source(ErrorKind::Database, format!("Database error: {err}"), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_carries_result() {
        let result = AvailabilityResult {
            court: false,
            equipment: Vec::new(),
            coach: true,
            all_available: false,
        };
        let err = AppError::unavailable(result);
        assert_eq!(err.kind, ErrorKind::Conflict);
        let carried = err.availability.as_ref().expect("payload");
        assert!(!carried.court);

        let cloned = err.clone();
        assert!(cloned.availability.is_some());
    }

    #[test]
    fn test_sanitized_hides_store_details() {
        let err = AppError::database("relation \"bookings\" does not exist").sanitized();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert!(!err.message.contains("bookings"));

        let err = AppError::validation("User email is required").sanitized();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "User email is required");
    }

    #[test]
    fn test_display() {
        let err = AppError::not_found("Court not found");
        assert_eq!(err.to_string(), "NOT_FOUND: Court not found");
    }
}
