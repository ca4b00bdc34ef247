//! Booking domain entities.

pub mod contact;
pub mod model;
pub mod status;

pub use contact::ContactInfo;
pub use model::{Booking, BookingFilter, BookingResources, EquipmentLine};
pub use status::BookingStatus;
