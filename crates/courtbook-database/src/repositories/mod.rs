//! PostgreSQL implementations of the store traits.

pub mod booking;
pub mod catalog;
pub mod pricing_rule;
mod rows;

pub use booking::BookingRepository;
pub use catalog::CatalogRepository;
pub use pricing_rule::PricingRuleRepository;
