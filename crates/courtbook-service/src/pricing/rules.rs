//! Rule predicates evaluated against a booking's start.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};

use courtbook_entity::court::CourtType;
use courtbook_entity::pricing::{PricingRule, RuleCondition};

/// Wall-clock facts a rule predicate can look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleContext {
    /// Facility-local hour of the booking start (0-23).
    pub hour: u32,
    /// Facility-local weekday of the booking start, 0 = Sunday.
    pub weekday: u8,
    /// Type of the booked court.
    pub court_type: CourtType,
}

impl RuleContext {
    /// Derive the context from a booking start in the facility timezone.
    pub fn new(start: DateTime<Utc>, tz: FixedOffset, court_type: CourtType) -> Self {
        let local = start.with_timezone(&tz);
        Self {
            hour: local.hour(),
            // num_days_from_sunday is 0..=6
            weekday: local.weekday().num_days_from_sunday() as u8,
            court_type,
        }
    }
}

/// Breakdown field a matching rule's fee is recorded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeTarget {
    /// `peak_hour_fee`.
    PeakHour,
    /// `weekend_fee`.
    Weekend,
    /// Counted in the total only.
    Total,
}

/// Whether the rule's predicate holds. Holiday, seasonal, and unknown rules
/// never match.
pub fn matches(condition: &RuleCondition, ctx: &RuleContext) -> bool {
    match condition {
        RuleCondition::PeakHour {
            start_time,
            end_time,
        } => {
            let start = u32::from(start_time.hour());
            let end = u32::from(end_time.hour());
            start <= ctx.hour && ctx.hour < end
        }
        RuleCondition::Weekend { days_of_week } => days_of_week.contains(&ctx.weekday),
        RuleCondition::CourtType {
            applicable_court_types,
        } => applicable_court_types.contains(&ctx.court_type),
        RuleCondition::Holiday { .. } | RuleCondition::Seasonal | RuleCondition::Unknown => false,
    }
}

/// The fee a rule contributes for this context, and where it is recorded.
pub fn evaluate(rule: &PricingRule, base_price: f64, ctx: &RuleContext) -> Option<(FeeTarget, f64)> {
    if !rule.is_active || !matches(&rule.condition, ctx) {
        return None;
    }
    let fee = rule.fee(base_price)?;
    let target = match rule.condition {
        RuleCondition::PeakHour { .. } => FeeTarget::PeakHour,
        RuleCondition::Weekend { .. } => FeeTarget::Weekend,
        _ => FeeTarget::Total,
    };
    Some((target, fee))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use courtbook_entity::pricing::ClockTime;

    fn peak(start: &str, end: &str) -> RuleCondition {
        RuleCondition::PeakHour {
            start_time: start.parse::<ClockTime>().unwrap(),
            end_time: end.parse::<ClockTime>().unwrap(),
        }
    }

    fn ctx(hour: u32, weekday: u8) -> RuleContext {
        RuleContext {
            hour,
            weekday,
            court_type: CourtType::Indoor,
        }
    }

    #[test]
    fn test_context_uses_facility_offset() {
        // Saturday 23:30 UTC is Sunday 01:30 at UTC+2.
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 23, 30, 0).unwrap();
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let ctx = RuleContext::new(start, tz, CourtType::Outdoor);
        assert_eq!(ctx.hour, 1);
        assert_eq!(ctx.weekday, 0);
        let utc = RuleContext::new(start, FixedOffset::east_opt(0).unwrap(), CourtType::Outdoor);
        assert_eq!((utc.hour, utc.weekday), (23, 6));
    }

    #[test]
    fn test_peak_window_is_hour_granular() {
        let rule = peak("18:30", "21:00");
        assert!(matches(&rule, &ctx(18, 1)));
        assert!(matches(&rule, &ctx(20, 1)));
        assert!(!matches(&rule, &ctx(21, 1)));
        assert!(!matches(&rule, &ctx(17, 1)));
    }

    #[test]
    fn test_weekend_and_court_type() {
        let weekend = RuleCondition::Weekend {
            days_of_week: vec![0, 6],
        };
        assert!(matches(&weekend, &ctx(10, 6)));
        assert!(!matches(&weekend, &ctx(10, 3)));

        let outdoor = RuleCondition::CourtType {
            applicable_court_types: vec![CourtType::Outdoor],
        };
        assert!(!matches(&outdoor, &ctx(10, 3)));
    }

    #[test]
    fn test_unpriced_kinds_never_match() {
        let holiday = RuleCondition::Holiday {
            days_of_week: vec![0, 1, 2, 3, 4, 5, 6],
        };
        assert!(!matches(&holiday, &ctx(10, 3)));
        assert!(!matches(&RuleCondition::Seasonal, &ctx(10, 3)));
        assert!(!matches(&RuleCondition::Unknown, &ctx(10, 3)));
    }

    #[test]
    fn test_evaluate_targets() {
        let rule = PricingRule::new("Peak", peak("18:00", "21:00"), 1).with_multiplier(1.5);
        assert_eq!(evaluate(&rule, 20.0, &ctx(19, 2)), Some((FeeTarget::PeakHour, 10.0)));

        let indoor = PricingRule::new(
            "Indoor",
            RuleCondition::CourtType {
                applicable_court_types: vec![CourtType::Indoor],
            },
            3,
        )
        .with_surcharge(5.0);
        assert_eq!(evaluate(&indoor, 20.0, &ctx(9, 2)), Some((FeeTarget::Total, 5.0)));

        let mut inactive = rule.clone();
        inactive.is_active = false;
        assert_eq!(evaluate(&inactive, 20.0, &ctx(19, 2)), None);
    }
}
