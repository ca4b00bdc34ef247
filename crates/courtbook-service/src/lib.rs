//! # courtbook-service
//!
//! Business logic for Courtbook: availability checks and slot enumeration,
//! rule-based pricing, the booking ledger with per-resource admission locks,
//! stock reconciliation, and catalog seeding. [`BookingEngine`] ties them
//! together over the store traits.

pub mod availability;
pub mod booking;
pub mod engine;
pub mod locks;
pub mod pricing;
pub mod reconcile;
pub mod seed;

pub use engine::{BookingEngine, BookingQuery};
