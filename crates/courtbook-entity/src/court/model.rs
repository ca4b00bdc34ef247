//! Court entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::id::CourtId;

use super::kind::{CourtType, Sport};

/// A bookable court. Courts have no capacity: a court is either occupied or
/// free for a given interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Court {
    /// Unique court identifier.
    pub id: CourtId,
    /// Display name.
    pub name: String,
    /// Indoor or outdoor; gates court-type pricing rules.
    pub court_type: CourtType,
    /// Sport the court is marked for.
    pub sport: Sport,
    /// Price of one booking before rules and add-ons.
    pub base_price: f64,
    /// Whether the court may be newly booked.
    pub is_active: bool,
    /// Free-text description.
    pub description: Option<String>,
    /// Listed amenities.
    pub amenities: Vec<String>,
    /// When the court was created.
    pub created_at: DateTime<Utc>,
    /// When the court was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Court {
    /// Create a new active court.
    pub fn new(
        name: impl Into<String>,
        court_type: CourtType,
        sport: Sport,
        base_price: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: CourtId::new(),
            name: name.into(),
            court_type,
            sport,
            base_price,
            is_active: true,
            description: None,
            amenities: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check catalog invariants.
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Court name is required"));
        }
        if !self.base_price.is_finite() || self.base_price < 0.0 {
            return Err(AppError::validation(
                "Court base price must be a non-negative number",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let court = Court::new("Court A", CourtType::Indoor, Sport::Badminton, 25.0);
        assert!(court.validate().is_ok());

        let mut negative = court.clone();
        negative.base_price = -1.0;
        assert!(negative.validate().is_err());

        let mut unnamed = court;
        unnamed.name = "   ".to_string();
        assert!(unnamed.validate().is_err());
    }
}
