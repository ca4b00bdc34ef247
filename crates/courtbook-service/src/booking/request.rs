//! Booking request and patch DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::id::{CoachId, CourtId};
use courtbook_core::types::interval::TimeInterval;
use courtbook_entity::booking::{Booking, BookingResources, ContactInfo, EquipmentLine};

const MAX_NOTES: usize = 1000;

/// Request to create a booking.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Who the booking is for.
    #[validate(nested)]
    pub user: ContactInfo,
    /// Court to book.
    pub court_id: CourtId,
    /// Inclusive start.
    pub start_time: DateTime<Utc>,
    /// Exclusive end.
    pub end_time: DateTime<Utc>,
    /// Equipment lines, in request order.
    #[serde(default)]
    pub equipment: Vec<EquipmentLine>,
    /// Coach to book.
    #[serde(default)]
    pub coach_id: Option<CoachId>,
    /// Free-text note.
    #[serde(default)]
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

impl BookingRequest {
    /// Normalize and validate the request, returning it with its interval.
    pub fn prepare(mut self) -> AppResult<(Self, TimeInterval)> {
        self.user = self.user.normalized();
        self.notes = normalize_notes(self.notes);
        let interval = TimeInterval::new(self.start_time, self.end_time)?;
        self.validate()?;
        check_quantities(&self.equipment)?;
        Ok((self, interval))
    }
}

/// Partial update of a booking. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Validate, Serialize, Deserialize)]
pub struct BookingPatch {
    /// Replacement contact details.
    #[serde(default)]
    #[validate(nested)]
    pub user: Option<ContactInfo>,
    /// Move to another court.
    #[serde(default)]
    pub court_id: Option<CourtId>,
    /// New start.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// New end.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Replacement equipment lines.
    #[serde(default)]
    pub equipment: Option<Vec<EquipmentLine>>,
    /// `Some(None)` removes the coach.
    #[serde(default, deserialize_with = "present")]
    pub coach_id: Option<Option<CoachId>>,
    /// `Some(None)` clears the note.
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
}

impl BookingPatch {
    /// Normalize and validate the patch.
    pub fn prepare(mut self) -> AppResult<Self> {
        self.user = self.user.map(ContactInfo::normalized);
        self.notes = self.notes.map(normalize_notes);
        self.validate()?;
        if let Some(Some(notes)) = &self.notes {
            check_notes(notes)?;
        }
        if let Some(lines) = &self.equipment {
            check_quantities(lines)?;
        }
        Ok(self)
    }

    /// The booking as it would look with this patch applied. Price, status,
    /// and timestamps are carried over unchanged.
    pub fn apply(&self, current: &Booking) -> AppResult<Booking> {
        let mut next = current.clone();
        if let Some(user) = &self.user {
            next.user = user.clone();
        }
        if let Some(court_id) = self.court_id {
            next.court_id = court_id;
        }
        if let Some(start) = self.start_time {
            next.start_time = start;
        }
        if let Some(end) = self.end_time {
            next.end_time = end;
        }
        if let Some(lines) = &self.equipment {
            next.resources.equipment = lines.clone();
        }
        if let Some(coach) = self.coach_id {
            next.resources.coach = coach;
        }
        if let Some(notes) = &self.notes {
            next.notes = notes.clone();
        }
        next.interval()?;
        Ok(next)
    }
}

/// Whether `next` holds different resources or a different interval than
/// `current`, so that admission has to be re-run.
pub fn changes_allocation(current: &Booking, next: &Booking) -> bool {
    current.court_id != next.court_id
        || current.start_time != next.start_time
        || current.end_time != next.end_time
        || !same_resources(&current.resources, &next.resources)
}

fn same_resources(a: &BookingResources, b: &BookingResources) -> bool {
    a.coach == b.coach && a.equipment == b.equipment
}

fn check_quantities(lines: &[EquipmentLine]) -> AppResult<()> {
    match lines.iter().find(|line| line.quantity == 0) {
        Some(line) => Err(AppError::validation(format!(
            "Quantity for equipment {} must be at least 1",
            line.equipment_id
        ))),
        None => Ok(()),
    }
}

fn check_notes(notes: &str) -> AppResult<()> {
    if notes.chars().count() > MAX_NOTES {
        return Err(AppError::validation(format!(
            "Notes must be at most {MAX_NOTES} characters"
        )));
    }
    Ok(())
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

/// Distinguishes an explicit `null` from an absent field.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use courtbook_core::error::ErrorKind;
    use courtbook_core::types::id::{BookingId, EquipmentId};
    use courtbook_entity::booking::BookingStatus;
    use courtbook_entity::pricing::PricingBreakdown;

    fn request() -> BookingRequest {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap();
        BookingRequest {
            user: ContactInfo::new(" Ada ", "ADA@example.com", "555"),
            court_id: CourtId::new(),
            start_time: start,
            end_time: start + Duration::hours(1),
            equipment: Vec::new(),
            coach_id: None,
            notes: Some("   ".to_string()),
        }
    }

    fn booking() -> Booking {
        let request = request();
        Booking {
            id: BookingId::new(),
            user: request.user.normalized(),
            court_id: request.court_id,
            start_time: request.start_time,
            end_time: request.end_time,
            resources: BookingResources::default(),
            status: BookingStatus::Confirmed,
            pricing_breakdown: PricingBreakdown::from_base(25.0),
            notes: None,
            created_at: request.start_time,
            updated_at: request.start_time,
        }
    }

    #[test]
    fn test_prepare_normalizes() {
        let (request, interval) = request().prepare().unwrap();
        assert_eq!(request.user.email, "ada@example.com");
        assert_eq!(request.user.name, "Ada");
        assert_eq!(request.notes, None);
        assert_eq!(interval.duration(), Duration::hours(1));
    }

    #[test]
    fn test_prepare_rejects_bad_input() {
        let mut inverted = request();
        inverted.end_time = inverted.start_time;
        assert_eq!(inverted.prepare().unwrap_err().kind, ErrorKind::InvalidInterval);

        let mut bad_email = request();
        bad_email.user.email = "not-an-email".to_string();
        assert_eq!(bad_email.prepare().unwrap_err().kind, ErrorKind::Validation);

        let mut zero = request();
        zero.equipment = vec![EquipmentLine::new(EquipmentId::new(), 0)];
        assert_eq!(zero.prepare().unwrap_err().kind, ErrorKind::Validation);
    }

    #[test]
    fn test_patch_contact_only_keeps_allocation() {
        let current = booking();
        let patch = BookingPatch {
            user: Some(ContactInfo::new("Grace", "grace@example.com", "556")),
            ..Default::default()
        }
        .prepare()
        .unwrap();
        let next = patch.apply(&current).unwrap();
        assert_eq!(next.user.name, "Grace");
        assert!(!changes_allocation(&current, &next));
    }

    #[test]
    fn test_patch_reschedule_changes_allocation() {
        let current = booking();
        let patch = BookingPatch {
            start_time: Some(current.start_time + Duration::hours(2)),
            end_time: Some(current.end_time + Duration::hours(2)),
            ..Default::default()
        };
        let next = patch.apply(&current).unwrap();
        assert!(changes_allocation(&current, &next));

        let inverted = BookingPatch {
            start_time: Some(current.end_time + Duration::hours(1)),
            ..Default::default()
        };
        assert_eq!(inverted.apply(&current).unwrap_err().kind, ErrorKind::InvalidInterval);
    }

    #[test]
    fn test_patch_null_coach_removes_it() {
        let mut current = booking();
        current.resources.coach = Some(CoachId::new());

        let absent: BookingPatch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.coach_id, None);
        assert_eq!(absent.apply(&current).unwrap().resources.coach, current.resources.coach);

        let cleared: BookingPatch = serde_json::from_str(r#"{"coach_id": null}"#).unwrap();
        assert_eq!(cleared.coach_id, Some(None));
        assert_eq!(cleared.apply(&current).unwrap().resources.coach, None);
    }
}
