//! Store traits the booking engine is written against.
//!
//! Implementations must make every booking write atomic together with its
//! equipment stock bookkeeping: either the booking row and all stock
//! adjustments persist, or none do. The store is also the last word on
//! exclusivity: it refuses a confirmed booking whose court or coach is
//! already held over an overlapping interval, whichever process wrote first.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use courtbook_core::result::AppResult;
use courtbook_core::types::id::{BookingId, CoachId, CourtId, EquipmentId, PricingRuleId};
use courtbook_core::types::interval::TimeInterval;
use courtbook_core::types::pagination::{PageRequest, PageResponse};
use courtbook_entity::booking::{Booking, BookingFilter};
use courtbook_entity::coach::Coach;
use courtbook_entity::court::Court;
use courtbook_entity::equipment::Equipment;
use courtbook_entity::pricing::{PricingRule, RuleType};

/// The resource whose bookings an overlap scan is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceScope {
    /// Bookings on a court.
    Court(CourtId),
    /// Bookings with a coach.
    Coach(CoachId),
    /// Bookings with at least one line of an equipment item.
    Equipment(EquipmentId),
}

impl ResourceScope {
    /// Whether a booking falls in this scope.
    pub fn contains(&self, booking: &Booking) -> bool {
        match self {
            Self::Court(id) => booking.court_id == *id,
            Self::Coach(id) => booking.has_coach(*id),
            Self::Equipment(id) => booking
                .resources
                .equipment
                .iter()
                .any(|line| line.equipment_id == *id),
        }
    }
}

/// An item's counter against the units the ledger says are held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockCount {
    /// `total_stock` of the item.
    pub total: u32,
    /// Units held by confirmed bookings.
    pub held: u32,
    /// `available_stock` before the recount.
    pub counter: u32,
}

impl StockCount {
    /// The counter value the ledger implies.
    pub fn expected(&self) -> u32 {
        self.total.saturating_sub(self.held)
    }

    /// Whether the counter disagreed with the ledger.
    pub fn drifted(&self) -> bool {
        self.counter != self.expected()
    }
}

/// Criteria for listing pricing rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleFilter {
    /// Only rules with this active flag.
    pub is_active: Option<bool>,
    /// Only rules of this type.
    pub rule_type: Option<RuleType>,
}

impl RuleFilter {
    /// Whether a rule satisfies the filter.
    pub fn matches(&self, rule: &PricingRule) -> bool {
        self.is_active.is_none_or(|active| rule.is_active == active)
            && self.rule_type.is_none_or(|kind| rule.rule_type() == kind)
    }
}

/// Read-mostly resource catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync + std::fmt::Debug {
    /// Find a court by id.
    async fn find_court(&self, id: CourtId) -> AppResult<Option<Court>>;

    /// All courts ordered by name.
    async fn list_courts(&self) -> AppResult<Vec<Court>>;

    /// Insert or replace a court.
    async fn upsert_court(&self, court: &Court) -> AppResult<Court>;

    /// Find an equipment item by id.
    async fn find_equipment(&self, id: EquipmentId) -> AppResult<Option<Equipment>>;

    /// All equipment ordered by name.
    async fn list_equipment(&self) -> AppResult<Vec<Equipment>>;

    /// Insert or replace an equipment item.
    async fn upsert_equipment(&self, equipment: &Equipment) -> AppResult<Equipment>;

    /// Overwrite an item's `available_stock` counter. Values above
    /// `total_stock` are rejected.
    async fn set_available_stock(&self, id: EquipmentId, available: u32) -> AppResult<Equipment>;

    /// Find a coach by id.
    async fn find_coach(&self, id: CoachId) -> AppResult<Option<Coach>>;

    /// All coaches ordered by name.
    async fn list_coaches(&self) -> AppResult<Vec<Coach>>;

    /// Insert or replace a coach.
    async fn upsert_coach(&self, coach: &Coach) -> AppResult<Coach>;
}

/// Pricing rule persistence.
#[async_trait]
pub trait PricingRuleStore: Send + Sync + std::fmt::Debug {
    /// Active rules in evaluation order: ascending priority, ties in
    /// insertion order.
    async fn find_active(&self) -> AppResult<Vec<PricingRule>>;

    /// Rules matching the filter, ordered by priority then name.
    async fn list_rules(&self, filter: &RuleFilter) -> AppResult<Vec<PricingRule>>;

    /// Insert or replace a rule.
    async fn upsert_rule(&self, rule: &PricingRule) -> AppResult<PricingRule>;

    /// Delete a rule. Returns `true` if it existed.
    async fn delete_rule(&self, id: PricingRuleId) -> AppResult<bool>;
}

/// The booking ledger.
#[async_trait]
pub trait BookingStore: Send + Sync + std::fmt::Debug {
    /// Find a booking by id.
    async fn find_by_id(&self, id: BookingId) -> AppResult<Option<Booking>>;

    /// Bookings matching the filter, ordered by start time.
    async fn list(
        &self,
        filter: &BookingFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Booking>>;

    /// Confirmed bookings in `scope` overlapping `interval`, optionally
    /// leaving one booking out.
    async fn find_confirmed_overlapping(
        &self,
        scope: ResourceScope,
        interval: &TimeInterval,
        exclude: Option<BookingId>,
    ) -> AppResult<Vec<Booking>>;

    /// Persist a new booking. A confirmed booking decrements
    /// `available_stock` for each equipment line in the same atomic unit;
    /// if any counter cannot cover its quantity, or the court or coach is
    /// already held over an overlapping interval, nothing is written and the
    /// error is a `Conflict`.
    async fn insert(&self, booking: &Booking) -> AppResult<Booking>;

    /// Transition a booking to cancelled, restoring stock if it was
    /// confirmed. Fails with `NotFound` or `AlreadyCancelled` without
    /// touching stock.
    async fn cancel(&self, id: BookingId) -> AppResult<Booking>;

    /// Replace `previous` with `updated`, applying the net stock difference
    /// atomically. Fails with `Conflict` if the stored booking no longer
    /// matches `previous`, or if `updated` is confirmed and its court or
    /// coach is held by another booking over an overlapping interval.
    async fn replace(&self, previous: &Booking, updated: &Booking) -> AppResult<Booking>;

    /// Units of each equipment item held by confirmed bookings.
    async fn confirmed_equipment_totals(&self) -> AppResult<BTreeMap<EquipmentId, u32>>;

    /// Reset an item's `available_stock` to its total minus the units held
    /// by confirmed bookings, serialized against booking writes on the item.
    /// Returns the count taken before the reset, or `None` if the item does
    /// not exist.
    async fn recount_stock(&self, id: EquipmentId) -> AppResult<Option<StockCount>>;
}

/// Whether two bookings claim the same court or the same coach. Intervals
/// are not compared.
pub fn shares_exclusive_resource(a: &Booking, b: &Booking) -> bool {
    a.court_id == b.court_id || a.resources.coach.is_some_and(|coach| b.has_coach(coach))
}

/// Net change in held units per item when `previous` becomes `updated`.
/// Positive values must be reserved, negative values released.
pub fn stock_delta(previous: &Booking, updated: &Booking) -> BTreeMap<EquipmentId, i64> {
    let mut delta = BTreeMap::new();
    if previous.is_confirmed() {
        for (id, qty) in previous.equipment_totals() {
            *delta.entry(id).or_insert(0) -= i64::from(qty);
        }
    }
    if updated.is_confirmed() {
        for (id, qty) in updated.equipment_totals() {
            *delta.entry(id).or_insert(0) += i64::from(qty);
        }
    }
    delta.retain(|_, change| *change != 0);
    delta
}
