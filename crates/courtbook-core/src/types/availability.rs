//! Availability and slot result types returned to callers.
//!
//! Unavailability is data, not an error: a refused resource is reported as
//! `false` with an itemized reason.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::EquipmentId;

/// Per-line equipment availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentAvailability {
    /// The requested equipment.
    pub equipment_id: EquipmentId,
    /// Display name, absent when the equipment does not exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_name: Option<String>,
    /// Quantity requested on this line.
    pub requested: u32,
    /// Residual capacity: available stock minus the quantity already held by
    /// overlapping confirmed bookings.
    pub available_stock: u32,
    /// Whether the residual covers the request.
    pub available: bool,
    /// Human-readable status.
    pub message: String,
}

impl EquipmentAvailability {
    /// A line whose equipment id does not resolve.
    pub fn not_found(equipment_id: EquipmentId, requested: u32) -> Self {
        Self {
            equipment_id,
            equipment_name: None,
            requested,
            available_stock: 0,
            available: false,
            message: "Equipment not found".to_string(),
        }
    }

    /// A resolved line with the given residual capacity.
    pub fn resolved(
        equipment_id: EquipmentId,
        equipment_name: impl Into<String>,
        requested: u32,
        residual: u32,
    ) -> Self {
        let available = residual >= requested;
        let message = if available {
            "Available".to_string()
        } else {
            format!("Only {residual} available")
        };
        Self {
            equipment_id,
            equipment_name: Some(equipment_name.into()),
            requested,
            available_stock: residual,
            available,
            message,
        }
    }
}

/// Outcome of checking a court, equipment lines, and an optional coach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResult {
    /// Whether the court is free.
    pub court: bool,
    /// One entry per requested equipment line, in request order.
    pub equipment: Vec<EquipmentAvailability>,
    /// Whether the coach is free, or `true` when no coach was requested.
    pub coach: bool,
    /// Conjunction of all of the above.
    pub all_available: bool,
}

impl AvailabilityResult {
    /// Build a result, deriving `all_available` from its parts.
    pub fn new(court: bool, equipment: Vec<EquipmentAvailability>, coach: bool) -> Self {
        let all_available = court && coach && equipment.iter().all(|line| line.available);
        Self {
            court,
            equipment,
            coach,
            all_available,
        }
    }

    /// Short list of the resources that failed, for log lines and messages.
    pub fn unavailable_resources(&self) -> Vec<String> {
        let mut failed = Vec::new();
        if !self.court {
            failed.push("court".to_string());
        }
        failed.extend(
            self.equipment
                .iter()
                .filter(|line| !line.available)
                .map(|line| format!("equipment:{}", line.equipment_id)),
        );
        if !self.coach {
            failed.push("coach".to_string());
        }
        failed
    }
}

/// A candidate booking window on a court's day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    /// Inclusive start.
    pub start_time: DateTime<Utc>,
    /// Exclusive end.
    pub end_time: DateTime<Utc>,
    /// Whether no confirmed booking on the court overlaps the slot.
    pub is_available: bool,
    /// Facility-local label, e.g. `"18:00 - 19:00"`.
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_available_is_conjunction() {
        let id = EquipmentId::new();
        let ok = EquipmentAvailability::resolved(id, "Racket", 2, 5);
        let short = EquipmentAvailability::resolved(id, "Racket", 4, 3);
        assert!(AvailabilityResult::new(true, vec![ok.clone()], true).all_available);
        assert!(!AvailabilityResult::new(true, vec![ok.clone(), short], true).all_available);
        assert!(!AvailabilityResult::new(false, vec![ok.clone()], true).all_available);
        assert!(!AvailabilityResult::new(true, vec![ok], false).all_available);
        assert!(AvailabilityResult::new(true, Vec::new(), true).all_available);
    }

    #[test]
    fn test_short_line_message() {
        let line = EquipmentAvailability::resolved(EquipmentId::new(), "Racket", 4, 3);
        assert!(!line.available);
        assert_eq!(line.message, "Only 3 available");
    }

    #[test]
    fn test_camel_case_shape() {
        let result = AvailabilityResult::new(
            true,
            vec![EquipmentAvailability::not_found(EquipmentId::new(), 1)],
            true,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["allAvailable"], false);
        assert_eq!(json["equipment"][0]["availableStock"], 0);
        assert_eq!(json["equipment"][0]["message"], "Equipment not found");
    }
}
