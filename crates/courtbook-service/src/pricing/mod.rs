//! Price calculation from court base price, active rules, equipment, and
//! coach.

pub mod calculator;
pub mod rules;

pub use calculator::{PriceCalculator, PricedLine, compute_breakdown};
pub use rules::{FeeTarget, RuleContext};
