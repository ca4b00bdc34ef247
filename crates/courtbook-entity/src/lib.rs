//! # courtbook-entity
//!
//! Domain entity models for Courtbook: the bookable resource catalog
//! (courts, equipment, coaches), pricing rules and the price breakdown they
//! produce, and bookings. Column-backed enums derive `sqlx::Type`; rows are
//! mapped by the database crate.

pub mod booking;
pub mod coach;
pub mod court;
pub mod equipment;
pub mod pricing;
