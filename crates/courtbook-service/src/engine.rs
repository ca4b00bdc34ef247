//! The booking engine facade: the operations exposed to front ends.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use courtbook_core::config::BookingConfig;
use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::availability::{AvailabilityResult, TimeSlot};
use courtbook_core::types::id::{BookingId, CoachId, CourtId, PricingRuleId};
use courtbook_core::types::interval::TimeInterval;
use courtbook_core::types::pagination::{PageRequest, PageResponse};
use courtbook_database::store::{BookingStore, CatalogStore, PricingRuleStore, RuleFilter};
use courtbook_database::{DatabasePool, MemoryStore};
use courtbook_entity::booking::{Booking, BookingFilter, BookingStatus, EquipmentLine};
use courtbook_entity::coach::Coach;
use courtbook_entity::court::Court;
use courtbook_entity::equipment::Equipment;
use courtbook_entity::pricing::{PricingBreakdown, PricingRule};

use crate::availability::AvailabilityChecker;
use crate::booking::{BookingLedger, BookingPatch, BookingRequest};
use crate::locks::ResourceLocks;
use crate::pricing::PriceCalculator;
use crate::reconcile::StockReconciler;
use crate::seed::{SeedReport, seed_catalog};

/// Booking listing criteria as front ends express them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingQuery {
    /// Only bookings with this status.
    pub status: Option<BookingStatus>,
    /// Only bookings on this court.
    pub court_id: Option<CourtId>,
    /// Only bookings starting on this facility-local day.
    pub date: Option<NaiveDate>,
}

/// Wires the stores into the checker, calculator, ledger, and reconciler.
#[derive(Debug, Clone)]
pub struct BookingEngine {
    catalog: Arc<dyn CatalogStore>,
    rules: Arc<dyn PricingRuleStore>,
    checker: AvailabilityChecker,
    pricing: PriceCalculator,
    ledger: BookingLedger,
    reconciler: StockReconciler,
    config: BookingConfig,
}

impl BookingEngine {
    /// Build an engine over the given stores.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        rules: Arc<dyn PricingRuleStore>,
        bookings: Arc<dyn BookingStore>,
        config: BookingConfig,
    ) -> Self {
        let locks = Arc::new(ResourceLocks::new());
        let checker = AvailabilityChecker::new(catalog.clone(), bookings.clone(), config.clone());
        let pricing = PriceCalculator::new(catalog.clone(), rules.clone(), config.clone());
        let ledger = BookingLedger::new(
            catalog.clone(),
            bookings.clone(),
            checker.clone(),
            pricing.clone(),
            locks.clone(),
            config.clone(),
        );
        let reconciler = StockReconciler::new(catalog.clone(), bookings, locks);
        Self {
            catalog,
            rules,
            checker,
            pricing,
            ledger,
            reconciler,
            config,
        }
    }

    /// Engine over a single in-memory store.
    pub fn in_memory(store: MemoryStore, config: BookingConfig) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store.clone(), store, config)
    }

    /// Engine over PostgreSQL repositories.
    pub fn postgres(db: &DatabasePool, config: BookingConfig) -> Self {
        Self::new(
            Arc::new(db.catalog()),
            Arc::new(db.pricing_rules()),
            Arc::new(db.bookings()),
            config,
        )
    }

    /// Engine configuration.
    pub fn config(&self) -> &BookingConfig {
        &self.config
    }

    /// Whether the court, each equipment line, and the coach are free over
    /// `[start, end)`.
    pub async fn check_availability(
        &self,
        court_id: CourtId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        equipment: &[EquipmentLine],
        coach_id: Option<CoachId>,
    ) -> AppResult<AvailabilityResult> {
        let interval = TimeInterval::new(start, end)?;
        self.checker
            .check(court_id, &interval, equipment, coach_id)
            .await
    }

    /// Slots of a court's facility-local day.
    pub async fn available_slots(
        &self,
        court_id: CourtId,
        date: NaiveDate,
    ) -> AppResult<Vec<TimeSlot>> {
        self.checker.available_slots(court_id, date).await
    }

    /// Price quote for a prospective booking.
    pub async fn calculate_price(
        &self,
        court_id: CourtId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        equipment: &[EquipmentLine],
        coach_id: Option<CoachId>,
    ) -> AppResult<PricingBreakdown> {
        let interval = TimeInterval::new(start, end)?;
        if let Some(line) = equipment.iter().find(|line| line.quantity == 0) {
            return Err(AppError::validation(format!(
                "Quantity for equipment {} must be at least 1",
                line.equipment_id
            )));
        }
        self.pricing
            .calculate(court_id, &interval, equipment, coach_id)
            .await
    }

    /// Admit a booking.
    pub async fn create_booking(&self, request: BookingRequest) -> AppResult<Booking> {
        self.ledger.create(request).await
    }

    /// Cancel a booking.
    pub async fn cancel_booking(&self, id: BookingId) -> AppResult<Booking> {
        self.ledger.cancel(id).await
    }

    /// Patch a booking, re-admitting it if its allocation changes.
    pub async fn update_booking(&self, id: BookingId, patch: BookingPatch) -> AppResult<Booking> {
        self.ledger.update(id, patch).await
    }

    /// Find a booking.
    pub async fn get_booking(&self, id: BookingId) -> AppResult<Booking> {
        self.ledger.get(id).await
    }

    /// List bookings by start time.
    pub async fn list_bookings(
        &self,
        query: &BookingQuery,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Booking>> {
        let starts_within = match query.date {
            Some(date) => Some(TimeInterval::local_day(date, self.config.timezone()?)?),
            None => None,
        };
        let filter = BookingFilter {
            status: query.status,
            court_id: query.court_id,
            starts_within,
        };
        self.ledger.list(&filter, page).await
    }

    /// All courts.
    pub async fn courts(&self) -> AppResult<Vec<Court>> {
        self.catalog.list_courts().await
    }

    /// All equipment.
    pub async fn equipment(&self) -> AppResult<Vec<Equipment>> {
        self.catalog.list_equipment().await
    }

    /// All coaches.
    pub async fn coaches(&self) -> AppResult<Vec<Coach>> {
        self.catalog.list_coaches().await
    }

    /// Pricing rules matching the filter.
    pub async fn pricing_rules(&self, filter: &RuleFilter) -> AppResult<Vec<PricingRule>> {
        self.rules.list_rules(filter).await
    }

    /// Insert or replace a pricing rule.
    pub async fn save_pricing_rule(&self, rule: &PricingRule) -> AppResult<PricingRule> {
        self.rules.upsert_rule(rule).await
    }

    /// Delete a pricing rule. Returns `true` if it existed.
    pub async fn delete_pricing_rule(&self, id: PricingRuleId) -> AppResult<bool> {
        self.rules.delete_rule(id).await
    }

    /// Load the sample catalog.
    pub async fn seed(&self, force: bool) -> AppResult<SeedReport> {
        seed_catalog(self.catalog.as_ref(), self.rules.as_ref(), force).await
    }

    /// The stock reconciler sharing this engine's admission locks.
    pub fn reconciler(&self) -> &StockReconciler {
        &self.reconciler
    }
}
