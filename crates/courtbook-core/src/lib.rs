//! # courtbook-core
//!
//! Core crate for Courtbook. Contains configuration schemas, typed
//! identifiers, time intervals and the overlap predicate, availability
//! result types, pagination, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Courtbook crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
