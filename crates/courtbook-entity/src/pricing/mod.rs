//! Pricing rule and price breakdown entities.

pub mod breakdown;
pub mod clock;
pub mod rule;

pub use breakdown::PricingBreakdown;
pub use clock::ClockTime;
pub use rule::{PricingRule, RuleCondition, RuleType};
