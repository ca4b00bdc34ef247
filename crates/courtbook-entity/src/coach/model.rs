//! Coach entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::id::CoachId;

use crate::court::Sport;

/// A bookable coach. A coach is a single-instance resource: either free or
/// booked for a given interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coach {
    /// Unique coach identifier.
    pub id: CoachId,
    /// Full name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Sports the coach teaches.
    pub specializations: Vec<Sport>,
    /// Fee added to a booking that includes this coach.
    pub hourly_rate: f64,
    /// Whether the coach may be newly booked.
    pub is_active: bool,
    /// Short biography.
    pub bio: Option<String>,
    /// Certifications held.
    pub certifications: Vec<String>,
    /// When the coach was created.
    pub created_at: DateTime<Utc>,
    /// When the coach was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Coach {
    /// Create a new active coach.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        specializations: Vec<Sport>,
        hourly_rate: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: CoachId::new(),
            name: name.into(),
            email: email.into().trim().to_lowercase(),
            phone: phone.into(),
            specializations,
            hourly_rate,
            is_active: true,
            bio: None,
            certifications: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the coach teaches the given sport.
    pub fn teaches(&self, sport: Sport) -> bool {
        self.specializations.contains(&sport)
    }

    /// Check catalog invariants.
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Coach name is required"));
        }
        if self.email.trim().is_empty() {
            return Err(AppError::validation("Email is required"));
        }
        if self.phone.trim().is_empty() {
            return Err(AppError::validation("Phone number is required"));
        }
        if self.specializations.is_empty() {
            return Err(AppError::validation(
                "Coach needs at least one specialization",
            ));
        }
        if !self.hourly_rate.is_finite() || self.hourly_rate < 0.0 {
            return Err(AppError::validation(
                "Hourly rate must be a non-negative number",
            ));
        }
        Ok(())
    }
}
