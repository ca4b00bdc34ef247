//! Conflict-based availability for a court, equipment lines, and a coach.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, instrument};

use courtbook_core::config::BookingConfig;
use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::availability::{AvailabilityResult, EquipmentAvailability, TimeSlot};
use courtbook_core::types::id::{BookingId, CoachId, CourtId, EquipmentId};
use courtbook_core::types::interval::TimeInterval;
use courtbook_database::store::{BookingStore, CatalogStore, ResourceScope};
use courtbook_entity::booking::{Booking, EquipmentLine};

use super::slots::DaySlots;

/// Answers whether resources are free over an interval by scanning
/// confirmed bookings in the ledger.
#[derive(Debug, Clone)]
pub struct AvailabilityChecker {
    catalog: Arc<dyn CatalogStore>,
    bookings: Arc<dyn BookingStore>,
    config: BookingConfig,
}

impl AvailabilityChecker {
    /// Create a checker over the given stores.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        bookings: Arc<dyn BookingStore>,
        config: BookingConfig,
    ) -> Self {
        Self {
            catalog,
            bookings,
            config,
        }
    }

    /// Check a prospective booking.
    ///
    /// A missing court or coach is a `NotFound` error; a missing equipment
    /// item is reported on its line. A zero quantity is a validation error.
    #[instrument(skip(self, equipment), fields(court_id = %court_id, lines = equipment.len()))]
    pub async fn check(
        &self,
        court_id: CourtId,
        interval: &TimeInterval,
        equipment: &[EquipmentLine],
        coach_id: Option<CoachId>,
    ) -> AppResult<AvailabilityResult> {
        self.evaluate(court_id, interval, equipment, coach_id, None)
            .await
    }

    /// Check a changed booking as if it were new, ignoring its own claim
    /// on the ledger and crediting its own units back to stock.
    pub async fn check_replacing(
        &self,
        current: &Booking,
        court_id: CourtId,
        interval: &TimeInterval,
        equipment: &[EquipmentLine],
        coach_id: Option<CoachId>,
    ) -> AppResult<AvailabilityResult> {
        self.evaluate(court_id, interval, equipment, coach_id, Some(current))
            .await
    }

    async fn evaluate(
        &self,
        court_id: CourtId,
        interval: &TimeInterval,
        equipment: &[EquipmentLine],
        coach_id: Option<CoachId>,
        current: Option<&Booking>,
    ) -> AppResult<AvailabilityResult> {
        if let Some(line) = equipment.iter().find(|line| line.quantity == 0) {
            return Err(AppError::validation(format!(
                "Quantity for equipment {} must be at least 1",
                line.equipment_id
            )));
        }
        let exclude = current.map(|b| b.id);

        let court = self.court_available(court_id, interval, exclude).await?;

        // Lines naming the same item draw on one stock.
        let mut earlier: HashMap<EquipmentId, u32> = HashMap::new();
        let mut lines = Vec::with_capacity(equipment.len());
        for line in equipment {
            let claimed = earlier.entry(line.equipment_id).or_insert(0);
            lines.push(self.equipment_line(line, *claimed, interval, current).await?);
            *claimed = claimed.saturating_add(line.quantity);
        }

        let coach = match coach_id {
            Some(coach_id) => self.coach_available(coach_id, interval, exclude).await?,
            None => true,
        };

        let result = AvailabilityResult::new(court, lines, coach);
        debug!(
            court_id = %court_id,
            interval = %interval,
            all_available = result.all_available,
            unavailable = ?result.unavailable_resources(),
            "Availability evaluated"
        );
        Ok(result)
    }

    async fn court_available(
        &self,
        court_id: CourtId,
        interval: &TimeInterval,
        exclude: Option<BookingId>,
    ) -> AppResult<bool> {
        if self.catalog.find_court(court_id).await?.is_none() {
            return Err(AppError::not_found(format!("Court {court_id} not found")));
        }
        let conflicts = self
            .bookings
            .find_confirmed_overlapping(ResourceScope::Court(court_id), interval, exclude)
            .await?;
        Ok(conflicts.is_empty())
    }

    async fn coach_available(
        &self,
        coach_id: CoachId,
        interval: &TimeInterval,
        exclude: Option<BookingId>,
    ) -> AppResult<bool> {
        if self.catalog.find_coach(coach_id).await?.is_none() {
            return Err(AppError::not_found(format!("Coach {coach_id} not found")));
        }
        let conflicts = self
            .bookings
            .find_confirmed_overlapping(ResourceScope::Coach(coach_id), interval, exclude)
            .await?;
        Ok(conflicts.is_empty())
    }

    /// Residual capacity is the item's available counter minus the units
    /// held by overlapping confirmed bookings and the units `claimed` by
    /// earlier lines of the same request.
    async fn equipment_line(
        &self,
        line: &EquipmentLine,
        claimed: u32,
        interval: &TimeInterval,
        current: Option<&Booking>,
    ) -> AppResult<EquipmentAvailability> {
        let Some(item) = self.catalog.find_equipment(line.equipment_id).await? else {
            return Ok(EquipmentAvailability::not_found(
                line.equipment_id,
                line.quantity,
            ));
        };

        let overlapping = self
            .bookings
            .find_confirmed_overlapping(
                ResourceScope::Equipment(line.equipment_id),
                interval,
                current.map(|b| b.id),
            )
            .await?;
        let usage: u32 = overlapping
            .iter()
            .map(|b| b.quantity_of(line.equipment_id))
            .sum();

        let credit = current
            .filter(|b| b.is_confirmed())
            .map_or(0, |b| b.quantity_of(line.equipment_id));
        let stock = item
            .available_stock
            .saturating_add(credit)
            .min(item.total_stock);
        let residual = stock.saturating_sub(usage).saturating_sub(claimed);

        Ok(EquipmentAvailability::resolved(
            item.id,
            item.name,
            line.quantity,
            residual,
        ))
    }

    /// Fixed-width slots across the operating window of a facility-local
    /// day, each marked by whether a confirmed booking on the court overlaps
    /// it.
    #[instrument(skip(self), fields(court_id = %court_id, date = %date))]
    pub async fn available_slots(
        &self,
        court_id: CourtId,
        date: NaiveDate,
    ) -> AppResult<Vec<TimeSlot>> {
        if self.catalog.find_court(court_id).await?.is_none() {
            return Err(AppError::not_found(format!("Court {court_id} not found")));
        }
        let tz = self.config.timezone()?;
        let day = TimeInterval::local_day(date, tz)?;
        let busy = self
            .bookings
            .find_confirmed_overlapping(ResourceScope::Court(court_id), &day, None)
            .await?
            .iter()
            .map(Booking::interval)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(DaySlots::new(date, &self.config, busy)?.collect())
    }
}
