//! Price calculator.
//!
//! [`compute_breakdown`] is a pure function of its inputs; [`PriceCalculator`]
//! resolves ids against the catalog and loads the active rule set before
//! calling it.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, instrument};

use courtbook_core::config::BookingConfig;
use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::id::{CoachId, CourtId};
use courtbook_core::types::interval::TimeInterval;
use courtbook_database::store::{CatalogStore, PricingRuleStore};
use courtbook_entity::booking::EquipmentLine;
use courtbook_entity::coach::Coach;
use courtbook_entity::court::Court;
use courtbook_entity::pricing::{PricingBreakdown, PricingRule};

use super::rules::{self, FeeTarget, RuleContext};

/// An equipment line with its unit rental price resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedLine {
    /// Rental price per unit.
    pub rental_price: f64,
    /// Units rented.
    pub quantity: u32,
}

/// Build the price breakdown for a booking starting at `start`.
///
/// `rules` must already be in evaluation order. Each matching rule adds its
/// fee to the total; peak-hour and weekend fees also overwrite their field,
/// so when two rules of the same kind match the field keeps only the last
/// fee while the total keeps both. The coach fee is the coach's hourly rate
/// charged once, regardless of duration.
pub fn compute_breakdown(
    court: &Court,
    start: DateTime<Utc>,
    tz: FixedOffset,
    rules: &[PricingRule],
    equipment: &[PricedLine],
    coach: Option<&Coach>,
) -> PricingBreakdown {
    let base_price = court.base_price;
    let mut breakdown = PricingBreakdown::from_base(base_price);
    let ctx = RuleContext::new(start, tz, court.court_type);

    for rule in rules {
        let Some((target, fee)) = rules::evaluate(rule, base_price, &ctx) else {
            continue;
        };
        match target {
            FeeTarget::PeakHour => breakdown.peak_hour_fee = fee,
            FeeTarget::Weekend => breakdown.weekend_fee = fee,
            FeeTarget::Total => {}
        }
        breakdown.total += fee;
    }

    breakdown.equipment_fee = equipment
        .iter()
        .map(|line| line.rental_price * f64::from(line.quantity))
        .sum();
    breakdown.total += breakdown.equipment_fee;

    if let Some(coach) = coach {
        breakdown.coach_fee = coach.hourly_rate;
        breakdown.total += breakdown.coach_fee;
    }

    breakdown
}

/// Resolves a booking request against the catalog and prices it with the
/// active rule set.
#[derive(Debug, Clone)]
pub struct PriceCalculator {
    catalog: Arc<dyn CatalogStore>,
    rules: Arc<dyn PricingRuleStore>,
    config: BookingConfig,
}

impl PriceCalculator {
    /// Create a calculator over the given stores.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        rules: Arc<dyn PricingRuleStore>,
        config: BookingConfig,
    ) -> Self {
        Self {
            catalog,
            rules,
            config,
        }
    }

    /// Price a prospective booking. Every referenced id must resolve.
    #[instrument(skip(self, equipment), fields(court_id = %court_id))]
    pub async fn calculate(
        &self,
        court_id: CourtId,
        interval: &TimeInterval,
        equipment: &[EquipmentLine],
        coach_id: Option<CoachId>,
    ) -> AppResult<PricingBreakdown> {
        let court = self
            .catalog
            .find_court(court_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Court {court_id} not found")))?;

        let mut priced = Vec::with_capacity(equipment.len());
        for line in equipment {
            let item = self
                .catalog
                .find_equipment(line.equipment_id)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!("Equipment {} not found", line.equipment_id))
                })?;
            priced.push(PricedLine {
                rental_price: item.rental_price,
                quantity: line.quantity,
            });
        }

        let coach = match coach_id {
            Some(coach_id) => Some(
                self.catalog
                    .find_coach(coach_id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Coach {coach_id} not found")))?,
            ),
            None => None,
        };

        let rules = self.rules.find_active().await?;
        let breakdown = compute_breakdown(
            &court,
            interval.start(),
            self.config.timezone()?,
            &rules,
            &priced,
            coach.as_ref(),
        );

        debug!(
            court_id = %court_id,
            rules = rules.len(),
            total = breakdown.total,
            "Price calculated"
        );
        Ok(breakdown)
    }
}
