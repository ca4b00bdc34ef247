//! In-memory store for single-process deployments and tests.
//!
//! All three store traits share one `RwLock`-guarded state, so a booking
//! write and its stock adjustments happen under the same write guard.

mod bookings;
mod catalog;
mod rules;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;

use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::id::{BookingId, CoachId, CourtId, EquipmentId};
use courtbook_entity::booking::Booking;
use courtbook_entity::coach::Coach;
use courtbook_entity::court::Court;
use courtbook_entity::equipment::Equipment;
use courtbook_entity::pricing::PricingRule;

use crate::store::shares_exclusive_resource;

/// Shared state behind the lock.
#[derive(Debug, Default)]
struct Inner {
    courts: HashMap<CourtId, Court>,
    equipment: HashMap<EquipmentId, Equipment>,
    coaches: HashMap<CoachId, Coach>,
    /// Insertion order is the priority tie-breaker.
    rules: Vec<PricingRule>,
    bookings: HashMap<BookingId, Booking>,
}

impl Inner {
    /// Apply per-item stock changes, all or nothing. Positive changes are
    /// reserved and must be covered by the counter; negative changes are
    /// released and capped at the item's total.
    fn apply_stock_delta(&mut self, delta: &BTreeMap<EquipmentId, i64>) -> AppResult<()> {
        for (id, change) in delta.iter().filter(|(_, change)| **change > 0) {
            let item = self
                .equipment
                .get(id)
                .ok_or_else(|| AppError::not_found(format!("Equipment {id} not found")))?;
            if i64::from(item.available_stock) < *change {
                return Err(AppError::conflict(format!(
                    "Insufficient stock for '{}': {} requested, {} available",
                    item.name, change, item.available_stock
                )));
            }
        }

        for (id, change) in delta {
            let Some(item) = self.equipment.get_mut(id) else {
                continue;
            };
            let quantity = u32::try_from(change.unsigned_abs()).unwrap_or(u32::MAX);
            if *change > 0 {
                item.reserve(quantity)?;
            } else {
                item.release(quantity);
            }
        }
        Ok(())
    }

    /// A confirmed booking may not share its court or coach with another
    /// confirmed booking over an overlapping interval.
    fn ensure_unclaimed(&self, booking: &Booking) -> AppResult<()> {
        if !booking.is_confirmed() {
            return Ok(());
        }
        let interval = booking.interval()?;
        for other in self.bookings.values() {
            if other.id == booking.id || !other.is_confirmed() {
                continue;
            }
            if shares_exclusive_resource(booking, other) && other.overlaps(&interval)? {
                return Err(AppError::conflict(format!(
                    "Booking {} overlaps confirmed booking {}",
                    booking.id, other.id
                )));
            }
        }
        Ok(())
    }

    /// Units of `id` held by confirmed bookings.
    fn held(&self, id: EquipmentId) -> u32 {
        self.bookings
            .values()
            .filter(|b| b.is_confirmed())
            .map(|b| b.quantity_of(id))
            .fold(0, u32::saturating_add)
    }
}

/// Store implementing [`CatalogStore`](crate::store::CatalogStore),
/// [`PricingRuleStore`](crate::store::PricingRuleStore), and
/// [`BookingStore`](crate::store::BookingStore) in process memory.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}
