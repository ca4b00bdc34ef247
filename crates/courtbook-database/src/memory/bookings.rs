use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;

use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::id::{BookingId, EquipmentId};
use courtbook_core::types::interval::TimeInterval;
use courtbook_core::types::pagination::{PageRequest, PageResponse};
use courtbook_entity::booking::{Booking, BookingFilter, BookingStatus};

use super::MemoryStore;
use crate::store::{BookingStore, ResourceScope, StockCount, stock_delta};

#[async_trait]
impl BookingStore for MemoryStore {
    async fn find_by_id(&self, id: BookingId) -> AppResult<Option<Booking>> {
        Ok(self.inner.read().await.bookings.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &BookingFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Booking>> {
        let inner = self.inner.read().await;
        let mut bookings: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(page.slice(bookings))
    }

    async fn find_confirmed_overlapping(
        &self,
        scope: ResourceScope,
        interval: &TimeInterval,
        exclude: Option<BookingId>,
    ) -> AppResult<Vec<Booking>> {
        let inner = self.inner.read().await;
        let mut found = Vec::new();
        for booking in inner.bookings.values() {
            if !booking.is_confirmed() || Some(booking.id) == exclude || !scope.contains(booking) {
                continue;
            }
            if booking.overlaps(interval)? {
                found.push(booking.clone());
            }
        }
        found.sort_by_key(|b| b.start_time);
        Ok(found)
    }

    async fn insert(&self, booking: &Booking) -> AppResult<Booking> {
        let mut inner = self.inner.write().await;
        if inner.bookings.contains_key(&booking.id) {
            return Err(AppError::conflict(format!(
                "Booking {} already exists",
                booking.id
            )));
        }

        inner.ensure_unclaimed(booking)?;
        if booking.is_confirmed() {
            let delta: BTreeMap<EquipmentId, i64> = booking
                .equipment_totals()
                .into_iter()
                .map(|(id, qty)| (id, i64::from(qty)))
                .collect();
            inner.apply_stock_delta(&delta)?;
        }

        inner.bookings.insert(booking.id, booking.clone());
        Ok(booking.clone())
    }

    async fn cancel(&self, id: BookingId) -> AppResult<Booking> {
        let mut inner = self.inner.write().await;
        let previous = inner
            .bookings
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Booking {id} not found")))?;
        if previous.status == BookingStatus::Cancelled {
            return Err(AppError::already_cancelled(format!(
                "Booking {id} is already cancelled"
            )));
        }

        let mut cancelled = previous.clone();
        cancelled.status = BookingStatus::Cancelled;
        cancelled.updated_at = Utc::now();

        inner.apply_stock_delta(&stock_delta(&previous, &cancelled))?;
        inner.bookings.insert(id, cancelled.clone());
        Ok(cancelled)
    }

    async fn replace(&self, previous: &Booking, updated: &Booking) -> AppResult<Booking> {
        if previous.id != updated.id {
            return Err(AppError::validation("Replacement must keep the booking id"));
        }
        let mut inner = self.inner.write().await;
        let stored = inner
            .bookings
            .get(&previous.id)
            .ok_or_else(|| AppError::not_found(format!("Booking {} not found", previous.id)))?;
        if stored.status != previous.status || stored.updated_at != previous.updated_at {
            return Err(AppError::conflict(format!(
                "Booking {} was modified concurrently",
                previous.id
            )));
        }

        inner.ensure_unclaimed(updated)?;
        inner.apply_stock_delta(&stock_delta(previous, updated))?;
        inner.bookings.insert(updated.id, updated.clone());
        Ok(updated.clone())
    }

    async fn confirmed_equipment_totals(&self) -> AppResult<BTreeMap<EquipmentId, u32>> {
        let inner = self.inner.read().await;
        let mut totals = BTreeMap::new();
        for booking in inner.bookings.values().filter(|b| b.is_confirmed()) {
            for (id, qty) in booking.equipment_totals() {
                *totals.entry(id).or_insert(0) += qty;
            }
        }
        Ok(totals)
    }

    async fn recount_stock(&self, id: EquipmentId) -> AppResult<Option<StockCount>> {
        let mut inner = self.inner.write().await;
        let held = inner.held(id);
        let Some(item) = inner.equipment.get_mut(&id) else {
            return Ok(None);
        };
        let count = StockCount {
            total: item.total_stock,
            held,
            counter: item.available_stock,
        };
        if count.drifted() {
            item.available_stock = count.expected();
            item.updated_at = Utc::now();
        }
        Ok(Some(count))
    }
}
