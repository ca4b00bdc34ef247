//! # courtbook-database
//!
//! The store abstraction the booking engine is written against, an
//! in-memory implementation, and PostgreSQL repositories implementing the
//! same traits, plus connection pool management and migrations.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{
    BookingStore, CatalogStore, PricingRuleStore, ResourceScope, RuleFilter, StockCount,
};
