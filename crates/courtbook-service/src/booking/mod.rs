//! Booking requests and the booking ledger.

pub mod ledger;
pub mod request;

pub use ledger::BookingLedger;
pub use request::{BookingPatch, BookingRequest};
