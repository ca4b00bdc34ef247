//! Core type definitions used across the Courtbook workspace.

pub mod availability;
pub mod id;
pub mod interval;
pub mod pagination;

pub use availability::{AvailabilityResult, EquipmentAvailability, TimeSlot};
pub use id::*;
pub use interval::{TimeInterval, overlaps};
pub use pagination::{PageRequest, PageResponse};
