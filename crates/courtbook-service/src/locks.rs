//! Per-resource admission locks.
//!
//! Every check-then-write sequence (create, update, cancel, stock
//! correction) holds the locks of all resources it touches. Locks are
//! always taken in [`ResourceKey`] order, so two sequences sharing
//! resources cannot deadlock.
//!
//! These locks are local to one process. Exclusion across processes is the
//! store's job; see [`BookingStore`](courtbook_database::store::BookingStore).

use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use courtbook_core::types::id::{CoachId, CourtId, EquipmentId};
use courtbook_entity::booking::{Booking, EquipmentLine};

/// A lockable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKey {
    /// A court.
    Court(CourtId),
    /// A coach.
    Coach(CoachId),
    /// An equipment item.
    Equipment(EquipmentId),
}

impl ResourceKey {
    /// Keys for a court, its equipment lines, and an optional coach.
    pub fn for_request(
        court_id: CourtId,
        equipment: &[EquipmentLine],
        coach: Option<CoachId>,
    ) -> Vec<Self> {
        std::iter::once(Self::Court(court_id))
            .chain(equipment.iter().map(|line| Self::Equipment(line.equipment_id)))
            .chain(coach.map(Self::Coach))
            .collect()
    }

    /// Keys for everything a booking holds.
    pub fn for_booking(booking: &Booking) -> Vec<Self> {
        Self::for_request(
            booking.court_id,
            &booking.resources.equipment,
            booking.resources.coach,
        )
    }
}

/// Guards held for the duration of one admission. Dropping it releases
/// every lock.
#[derive(Debug)]
pub struct AdmissionGuard {
    keys: Vec<ResourceKey>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl AdmissionGuard {
    /// The keys held, in acquisition order.
    pub fn keys(&self) -> &[ResourceKey] {
        &self.keys
    }
}

/// Registry of one async mutex per resource, created on first use.
#[derive(Debug, Default)]
pub struct ResourceLocks {
    locks: DashMap<ResourceKey, Arc<Mutex<()>>>,
}

impl ResourceLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the locks of all `keys`, deduplicated and in order.
    pub async fn acquire(&self, keys: impl IntoIterator<Item = ResourceKey>) -> AdmissionGuard {
        let keys: BTreeSet<ResourceKey> = keys.into_iter().collect();
        let mut guards = Vec::with_capacity(keys.len());
        for key in &keys {
            let lock = self.locks.entry(*key).or_default().value().clone();
            guards.push(lock.lock_owned().await);
        }
        AdmissionGuard {
            keys: keys.into_iter().collect(),
            _guards: guards,
        }
    }

    /// Number of resources that have ever been locked.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no resource has been locked yet.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
