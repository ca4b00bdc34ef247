//! Pricing rule entity.
//!
//! A rule is a closed sum type over its kinds; each kind carries only the
//! predicate payload it needs. Kinds this build does not know deserialize to
//! [`RuleCondition::Unknown`] and never affect a price.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::id::PricingRuleId;

use super::clock::ClockTime;
use crate::court::CourtType;

/// Flat rule type tag, used for filtering and storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// Time-of-day window.
    PeakHour,
    /// Days of the week.
    Weekend,
    /// Days of the week flagged as holidays.
    Holiday,
    /// Seasonal adjustment.
    Seasonal,
    /// Indoor/outdoor court type.
    CourtType,
    /// A kind this build does not know.
    Unknown,
}

impl RuleType {
    /// Return the type as its stored snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PeakHour => "peak_hour",
            Self::Weekend => "weekend",
            Self::Holiday => "holiday",
            Self::Seasonal => "seasonal",
            Self::CourtType => "court_type",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "peak_hour" => Ok(Self::PeakHour),
            "weekend" => Ok(Self::Weekend),
            "holiday" => Ok(Self::Holiday),
            "seasonal" => Ok(Self::Seasonal),
            "court_type" => Ok(Self::CourtType),
            _ => Err(AppError::validation(format!(
                "Invalid rule type: '{s}'. Expected one of: peak_hour, weekend, holiday, seasonal, court_type"
            ))),
        }
    }
}

/// The predicate half of a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleCondition {
    /// Matches when the booking starts in `[start_time, end_time)`, compared
    /// at hour granularity.
    PeakHour {
        /// Window start (inclusive).
        start_time: ClockTime,
        /// Window end (exclusive).
        end_time: ClockTime,
    },
    /// Matches when the booking starts on one of the listed weekdays.
    Weekend {
        /// Weekdays, 0 = Sunday through 6 = Saturday.
        days_of_week: Vec<u8>,
    },
    /// Holiday days of week. Stored but not priced.
    Holiday {
        /// Weekdays, 0 = Sunday through 6 = Saturday.
        #[serde(default)]
        days_of_week: Vec<u8>,
    },
    /// Seasonal adjustment. Stored but not priced.
    Seasonal,
    /// Matches when the court's type is listed.
    CourtType {
        /// Court types the rule applies to.
        applicable_court_types: Vec<CourtType>,
    },
    /// A rule kind unknown to this build.
    #[serde(other)]
    Unknown,
}

impl RuleCondition {
    /// The flat type tag of this condition.
    pub fn rule_type(&self) -> RuleType {
        match self {
            Self::PeakHour { .. } => RuleType::PeakHour,
            Self::Weekend { .. } => RuleType::Weekend,
            Self::Holiday { .. } => RuleType::Holiday,
            Self::Seasonal => RuleType::Seasonal,
            Self::CourtType { .. } => RuleType::CourtType,
            Self::Unknown => RuleType::Unknown,
        }
    }
}

/// A named, prioritized, independently toggled price modifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRule {
    /// Unique rule identifier.
    pub id: PricingRuleId,
    /// Display name.
    pub name: String,
    /// Kind-specific predicate.
    #[serde(flatten)]
    pub condition: RuleCondition,
    /// Values above 1 add `base_price * (multiplier - 1)`.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Flat fee, used only when `multiplier <= 1`.
    #[serde(default)]
    pub surcharge: f64,
    /// Evaluation order, ascending. At least 1.
    #[serde(default = "default_priority")]
    pub priority: u32,
    /// Whether the rule takes part in pricing.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// When the rule was created. Breaks priority ties.
    pub created_at: DateTime<Utc>,
}

impl PricingRule {
    /// Create a new active rule with a neutral effect.
    pub fn new(name: impl Into<String>, condition: RuleCondition, priority: u32) -> Self {
        Self {
            id: PricingRuleId::new(),
            name: name.into(),
            condition,
            multiplier: default_multiplier(),
            surcharge: 0.0,
            priority,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Set the multiplier.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Set the flat surcharge.
    pub fn with_surcharge(mut self, surcharge: f64) -> Self {
        self.surcharge = surcharge;
        self
    }

    /// The flat type tag of this rule.
    pub fn rule_type(&self) -> RuleType {
        self.condition.rule_type()
    }

    /// The fee this rule contributes when it matches: the multiplier takes
    /// precedence, the surcharge applies only when the multiplier is at most
    /// 1, and a rule with neither contributes nothing.
    pub fn fee(&self, base_price: f64) -> Option<f64> {
        if self.multiplier > 1.0 {
            Some(base_price * (self.multiplier - 1.0))
        } else if self.surcharge > 0.0 {
            Some(self.surcharge)
        } else {
            None
        }
    }

    /// Check rule invariants.
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Rule name is required"));
        }
        if !self.multiplier.is_finite() || self.multiplier < 0.0 {
            return Err(AppError::validation("Multiplier must be non-negative"));
        }
        if !self.surcharge.is_finite() || self.surcharge < 0.0 {
            return Err(AppError::validation("Surcharge must be non-negative"));
        }
        if self.priority < 1 {
            return Err(AppError::validation("Priority must be at least 1"));
        }
        match &self.condition {
            RuleCondition::Weekend { days_of_week } | RuleCondition::Holiday { days_of_week } => {
                if let Some(day) = days_of_week.iter().find(|d| **d > 6) {
                    return Err(AppError::validation(format!(
                        "Day of week {day} is out of range 0-6"
                    )));
                }
            }
            RuleCondition::CourtType {
                applicable_court_types,
            } if applicable_court_types.is_empty() => {
                return Err(AppError::validation(
                    "Court type rule needs at least one court type",
                ));
            }
            _ => {}
        }
        Ok(())
    }
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_priority() -> u32 {
    1
}

fn default_true() -> bool {
    true
}
