//! Booking ledger: admission, cancellation, and rescheduling.
//!
//! Each write holds the admission locks of every resource it touches from
//! the availability check until the store has committed, and runs under the
//! configured admission timeout. A timed-out admission persists nothing.
//!
//! The locks order writers within this process. Writers in other processes
//! sharing the store are ordered by the store itself, which refuses a write
//! whose court, coach, or stock was claimed after our check; such a refusal
//! is re-checked so the caller still sees which resource was taken.

use std::future::Future;
use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use tracing::{info, instrument, warn};

use courtbook_core::config::BookingConfig;
use courtbook_core::error::{AppError, ErrorKind};
use courtbook_core::result::AppResult;
use courtbook_core::types::id::{BookingId, CoachId, CourtId};
use courtbook_core::types::pagination::{PageRequest, PageResponse};
use courtbook_database::store::{BookingStore, CatalogStore};
use courtbook_entity::booking::{
    Booking, BookingFilter, BookingResources, BookingStatus, EquipmentLine,
};

use super::request::{BookingPatch, BookingRequest, changes_allocation};
use crate::availability::AvailabilityChecker;
use crate::locks::{ResourceKey, ResourceLocks};
use crate::pricing::PriceCalculator;

/// Owns every mutation of the booking ledger.
#[derive(Debug, Clone)]
pub struct BookingLedger {
    catalog: Arc<dyn CatalogStore>,
    bookings: Arc<dyn BookingStore>,
    checker: AvailabilityChecker,
    pricing: PriceCalculator,
    locks: Arc<ResourceLocks>,
    config: BookingConfig,
}

impl BookingLedger {
    /// Create a ledger.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        bookings: Arc<dyn BookingStore>,
        checker: AvailabilityChecker,
        pricing: PriceCalculator,
        locks: Arc<ResourceLocks>,
        config: BookingConfig,
    ) -> Self {
        Self {
            catalog,
            bookings,
            checker,
            pricing,
            locks,
            config,
        }
    }

    /// Admit a new booking.
    ///
    /// Availability is re-checked while the court, coach, and equipment
    /// locks are held; a failed check is a `Conflict` carrying the
    /// availability result.
    #[instrument(skip(self, request), fields(court_id = %request.court_id))]
    pub async fn create(&self, request: BookingRequest) -> AppResult<Booking> {
        let (request, interval) = request.prepare()?;
        self.ensure_bookable(request.court_id, &request.equipment, request.coach_id)
            .await?;

        let keys = ResourceKey::for_request(request.court_id, &request.equipment, request.coach_id);
        let booking = self
            .with_timeout("create", async move {
                let _guard = self.locks.acquire(keys).await;

                let availability = self
                    .checker
                    .check(
                        request.court_id,
                        &interval,
                        &request.equipment,
                        request.coach_id,
                    )
                    .await?;
                if !availability.all_available {
                    warn!(
                        court_id = %request.court_id,
                        interval = %interval,
                        unavailable = ?availability.unavailable_resources(),
                        "Booking refused"
                    );
                    return Err(AppError::unavailable(availability));
                }

                let pricing_breakdown = self
                    .pricing
                    .calculate(
                        request.court_id,
                        &interval,
                        &request.equipment,
                        request.coach_id,
                    )
                    .await?;

                let now = Utc::now().trunc_subsecs(6);
                let booking = Booking {
                    id: BookingId::new(),
                    user: request.user,
                    court_id: request.court_id,
                    start_time: interval.start(),
                    end_time: interval.end(),
                    resources: BookingResources {
                        equipment: request.equipment,
                        coach: request.coach_id,
                    },
                    status: BookingStatus::Confirmed,
                    pricing_breakdown,
                    notes: request.notes,
                    created_at: now,
                    updated_at: now,
                };
                match self.bookings.insert(&booking).await {
                    Err(err) => Err(self.explain_refusal(err, &booking, None).await),
                    inserted => inserted,
                }
            })
            .await?;

        info!(
            booking_id = %booking.id,
            court_id = %booking.court_id,
            start = %booking.start_time,
            end = %booking.end_time,
            total = booking.pricing_breakdown.total,
            "Booking confirmed"
        );
        Ok(booking)
    }

    /// Cancel a booking and release its equipment. Cancelling twice fails
    /// with `AlreadyCancelled` and restores nothing.
    #[instrument(skip(self), fields(booking_id = %id))]
    pub async fn cancel(&self, id: BookingId) -> AppResult<Booking> {
        let current = self.get(id).await?;
        if current.status == BookingStatus::Cancelled {
            return Err(AppError::already_cancelled(format!(
                "Booking {id} is already cancelled"
            )));
        }

        let keys = ResourceKey::for_booking(&current);
        let cancelled = self
            .with_timeout("cancel", async move {
                let _guard = self.locks.acquire(keys).await;
                self.bookings.cancel(id).await
            })
            .await?;

        info!(
            booking_id = %id,
            court_id = %cancelled.court_id,
            released = cancelled.resources.equipment.len(),
            "Booking cancelled"
        );
        Ok(cancelled)
    }

    /// Apply a patch to a booking.
    ///
    /// Changes to contact details or notes are written directly. A change of
    /// court, interval, equipment, or coach is admitted like a new booking
    /// that ignores the booking's own claim, and the booking is repriced.
    #[instrument(skip(self, patch), fields(booking_id = %id))]
    pub async fn update(&self, id: BookingId, patch: BookingPatch) -> AppResult<Booking> {
        let patch = patch.prepare()?;
        let current = self.get(id).await?;
        let next = patch.apply(&current)?;

        if !changes_allocation(&current, &next) {
            let mut next = next;
            next.updated_at = Utc::now().trunc_subsecs(6);
            let updated = self.bookings.replace(&current, &next).await?;
            info!(booking_id = %id, "Booking details updated");
            return Ok(updated);
        }

        if current.status == BookingStatus::Cancelled {
            return Err(AppError::already_cancelled(format!(
                "Booking {id} is cancelled and cannot be rescheduled"
            )));
        }
        self.ensure_bookable(
            next.court_id,
            &next.resources.equipment,
            next.resources.coach,
        )
        .await?;

        let mut keys = ResourceKey::for_booking(&current);
        keys.extend(ResourceKey::for_booking(&next));
        let version = current.updated_at;
        let updated = self
            .with_timeout("update", async move {
                let _guard = self.locks.acquire(keys).await;

                // The locks cover the snapshot's resources only.
                let current = self.get(id).await?;
                if current.updated_at != version {
                    return Err(AppError::conflict(format!(
                        "Booking {id} was modified concurrently"
                    )));
                }
                let mut next = patch.apply(&current)?;
                let interval = next.interval()?;

                if next.is_confirmed() {
                    let availability = self
                        .checker
                        .check_replacing(
                            &current,
                            next.court_id,
                            &interval,
                            &next.resources.equipment,
                            next.resources.coach,
                        )
                        .await?;
                    if !availability.all_available {
                        warn!(
                            booking_id = %id,
                            interval = %interval,
                            unavailable = ?availability.unavailable_resources(),
                            "Reschedule refused"
                        );
                        return Err(AppError::unavailable(availability));
                    }
                }

                next.pricing_breakdown = self
                    .pricing
                    .calculate(
                        next.court_id,
                        &interval,
                        &next.resources.equipment,
                        next.resources.coach,
                    )
                    .await?;
                next.updated_at = Utc::now().trunc_subsecs(6);
                match self.bookings.replace(&current, &next).await {
                    Err(err) => Err(self.explain_refusal(err, &next, Some(&current)).await),
                    replaced => replaced,
                }
            })
            .await?;

        info!(
            booking_id = %id,
            court_id = %updated.court_id,
            start = %updated.start_time,
            end = %updated.end_time,
            total = updated.pricing_breakdown.total,
            "Booking rescheduled"
        );
        Ok(updated)
    }

    /// Find a booking by id.
    pub async fn get(&self, id: BookingId) -> AppResult<Booking> {
        self.bookings
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {id} not found")))
    }

    /// List bookings, ordered by start time.
    pub async fn list(
        &self,
        filter: &BookingFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Booking>> {
        self.bookings.list(filter, page).await
    }

    /// Every referenced resource must exist and be active.
    async fn ensure_bookable(
        &self,
        court_id: CourtId,
        equipment: &[EquipmentLine],
        coach_id: Option<CoachId>,
    ) -> AppResult<()> {
        let court = self
            .catalog
            .find_court(court_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Court {court_id} not found")))?;
        if !court.is_active {
            return Err(AppError::validation(format!(
                "Court '{}' is not available for booking",
                court.name
            )));
        }

        for line in equipment {
            let item = self
                .catalog
                .find_equipment(line.equipment_id)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!("Equipment {} not found", line.equipment_id))
                })?;
            if !item.is_active {
                return Err(AppError::validation(format!(
                    "Equipment '{}' is not available for rental",
                    item.name
                )));
            }
        }

        if let Some(coach_id) = coach_id {
            let coach = self
                .catalog
                .find_coach(coach_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Coach {coach_id} not found")))?;
            if !coach.is_active {
                return Err(AppError::validation(format!(
                    "Coach '{}' is not available for booking",
                    coach.name
                )));
            }
        }
        Ok(())
    }

    /// Turn a bare store `Conflict` on `candidate` into an availability
    /// refusal when a fresh check shows a resource is taken. Any other error,
    /// or a check that finds everything free, is returned unchanged.
    async fn explain_refusal(
        &self,
        err: AppError,
        candidate: &Booking,
        current: Option<&Booking>,
    ) -> AppError {
        if err.kind != ErrorKind::Conflict || err.availability.is_some() {
            return err;
        }
        let Ok(interval) = candidate.interval() else {
            return err;
        };
        let equipment = &candidate.resources.equipment;
        let coach_id = candidate.resources.coach;
        let checked = match current {
            Some(current) => {
                self.checker
                    .check_replacing(current, candidate.court_id, &interval, equipment, coach_id)
                    .await
            }
            None => {
                self.checker
                    .check(candidate.court_id, &interval, equipment, coach_id)
                    .await
            }
        };
        match checked {
            Ok(availability) if !availability.all_available => {
                warn!(
                    booking_id = %candidate.id,
                    interval = %interval,
                    unavailable = ?availability.unavailable_resources(),
                    "Store refused booking, resource claimed concurrently"
                );
                AppError::unavailable(availability)
            }
            _ => err,
        }
    }

    async fn with_timeout<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        let limit = self.config.admission_timeout();
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = limit.as_millis() as u64,
                    "Admission timed out"
                );
                Err(AppError::service_unavailable(format!(
                    "Booking {operation} timed out after {}ms",
                    limit.as_millis()
                )))
            }
        }
    }
}
