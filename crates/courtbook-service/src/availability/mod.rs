//! Availability checks and slot enumeration.

pub mod checker;
pub mod slots;

pub use checker::AvailabilityChecker;
pub use slots::DaySlots;
