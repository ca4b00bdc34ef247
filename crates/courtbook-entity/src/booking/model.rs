//! Booking entity model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courtbook_core::result::AppResult;
use courtbook_core::types::id::{BookingId, CoachId, CourtId, EquipmentId};
use courtbook_core::types::interval::TimeInterval;

use super::contact::ContactInfo;
use super::status::BookingStatus;
use crate::pricing::PricingBreakdown;

/// One equipment request: an item and how many units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EquipmentLine {
    /// Requested item.
    pub equipment_id: EquipmentId,
    /// Units requested, at least 1.
    pub quantity: u32,
}

impl EquipmentLine {
    /// Create an equipment line.
    pub fn new(equipment_id: EquipmentId, quantity: u32) -> Self {
        Self {
            equipment_id,
            quantity,
        }
    }
}

/// Add-on resources held by a booking besides its court.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BookingResources {
    /// Equipment lines in request order. The same item may appear on more
    /// than one line.
    #[serde(default)]
    pub equipment: Vec<EquipmentLine>,
    /// Booked coach, if any.
    pub coach: Option<CoachId>,
}

/// A reservation of a court, optional equipment, and an optional coach over
/// a half-open interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: BookingId,
    /// Who the booking is for.
    pub user: ContactInfo,
    /// Booked court.
    pub court_id: CourtId,
    /// Inclusive start.
    pub start_time: DateTime<Utc>,
    /// Exclusive end.
    pub end_time: DateTime<Utc>,
    /// Equipment and coach.
    pub resources: BookingResources,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Price computed at admission.
    pub pricing_breakdown: PricingBreakdown,
    /// Free-text note.
    pub notes: Option<String>,
    /// When the booking was created.
    pub created_at: DateTime<Utc>,
    /// When the booking was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Whether the booking holds its resources.
    pub fn is_confirmed(&self) -> bool {
        self.status.holds_resources()
    }

    /// The booking's interval.
    pub fn interval(&self) -> AppResult<TimeInterval> {
        TimeInterval::new(self.start_time, self.end_time)
    }

    /// Whether the booking's interval overlaps `interval`.
    pub fn overlaps(&self, interval: &TimeInterval) -> AppResult<bool> {
        interval.overlaps_range(self.start_time, self.end_time)
    }

    /// Units of `equipment_id` across all of this booking's lines.
    pub fn quantity_of(&self, equipment_id: EquipmentId) -> u32 {
        self.resources
            .equipment
            .iter()
            .filter(|line| line.equipment_id == equipment_id)
            .map(|line| line.quantity)
            .sum()
    }

    /// Units per equipment item, with repeated lines merged.
    pub fn equipment_totals(&self) -> BTreeMap<EquipmentId, u32> {
        let mut totals = BTreeMap::new();
        for line in &self.resources.equipment {
            *totals.entry(line.equipment_id).or_insert(0) += line.quantity;
        }
        totals
    }

    /// Whether the booking references the coach.
    pub fn has_coach(&self, coach_id: CoachId) -> bool {
        self.resources.coach == Some(coach_id)
    }
}

/// Criteria for listing bookings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingFilter {
    /// Only bookings with this status.
    pub status: Option<BookingStatus>,
    /// Only bookings on this court.
    pub court_id: Option<CourtId>,
    /// Only bookings starting inside this interval.
    pub starts_within: Option<TimeInterval>,
}

impl BookingFilter {
    /// Whether a booking satisfies every set criterion.
    pub fn matches(&self, booking: &Booking) -> bool {
        self.status.is_none_or(|status| booking.status == status)
            && self.court_id.is_none_or(|court| booking.court_id == court)
            && self.starts_within.is_none_or(|window| {
                window.start() <= booking.start_time && booking.start_time < window.end()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn booking_with_lines(lines: Vec<EquipmentLine>) -> Booking {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap();
        Booking {
            id: BookingId::new(),
            user: ContactInfo::new("Ada", "ada@example.com", "555"),
            court_id: CourtId::new(),
            start_time: start,
            end_time: start + Duration::hours(1),
            resources: BookingResources {
                equipment: lines,
                coach: None,
            },
            status: BookingStatus::Confirmed,
            pricing_breakdown: PricingBreakdown::from_base(25.0),
            notes: None,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn test_quantity_of_sums_repeated_lines() {
        let racket = EquipmentId::new();
        let shoes = EquipmentId::new();
        let booking = booking_with_lines(vec![
            EquipmentLine::new(racket, 2),
            EquipmentLine::new(shoes, 1),
            EquipmentLine::new(racket, 3),
        ]);
        assert_eq!(booking.quantity_of(racket), 5);
        assert_eq!(booking.quantity_of(shoes), 1);
        assert_eq!(booking.quantity_of(EquipmentId::new()), 0);

        let totals = booking.equipment_totals();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&racket], 5);
    }

    #[test]
    fn test_overlaps() {
        let booking = booking_with_lines(Vec::new());
        let after = TimeInterval::new(booking.end_time, booking.end_time + Duration::hours(1)).unwrap();
        assert!(!booking.overlaps(&after).unwrap());
        let inside = TimeInterval::new(
            booking.start_time + Duration::minutes(15),
            booking.start_time + Duration::minutes(30),
        )
        .unwrap();
        assert!(booking.overlaps(&inside).unwrap());
    }

    #[test]
    fn test_filter_matches() {
        let booking = booking_with_lines(Vec::new());
        assert!(BookingFilter::default().matches(&booking));

        let cancelled_only = BookingFilter {
            status: Some(BookingStatus::Cancelled),
            ..Default::default()
        };
        assert!(!cancelled_only.matches(&booking));

        let same_day = BookingFilter {
            starts_within: Some(
                TimeInterval::new(
                    Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
                    Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap(),
                )
                .unwrap(),
            ),
            court_id: Some(booking.court_id),
            ..Default::default()
        };
        assert!(same_day.matches(&booking));
    }
}
