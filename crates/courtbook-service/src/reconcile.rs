//! Equipment stock reconciliation between the `available_stock` counters and
//! the booking ledger.
//!
//! The ledger is the source of truth: an item's counter should equal its
//! total stock minus the units held by confirmed bookings.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time;
use tracing::{error, info, warn};

use courtbook_core::result::AppResult;
use courtbook_core::types::id::EquipmentId;
use courtbook_database::store::{BookingStore, CatalogStore};

use crate::locks::{ResourceKey, ResourceLocks};

/// A counter found out of line with the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockDrift {
    /// Equipment item.
    pub equipment_id: EquipmentId,
    /// Item name.
    pub name: String,
    /// Counter value before correction.
    pub counter: u32,
    /// Value derived from the ledger.
    pub expected: u32,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    /// Items examined.
    pub checked: usize,
    /// Items whose counter was corrected.
    pub corrections: Vec<StockDrift>,
}

impl ReconcileReport {
    /// Whether any counter had drifted.
    pub fn drift_detected(&self) -> bool {
        !self.corrections.is_empty()
    }
}

/// Detects and corrects equipment counter drift.
#[derive(Debug, Clone)]
pub struct StockReconciler {
    catalog: Arc<dyn CatalogStore>,
    bookings: Arc<dyn BookingStore>,
    locks: Arc<ResourceLocks>,
}

impl StockReconciler {
    /// Creates a new stock reconciler.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        bookings: Arc<dyn BookingStore>,
        locks: Arc<ResourceLocks>,
    ) -> Self {
        Self {
            catalog,
            bookings,
            locks,
        }
    }

    /// Performs a full reconciliation pass. Each item is recounted by the
    /// store, serialized against booking writes on that item in any process,
    /// while this process's admission lock on the item is also held.
    pub async fn reconcile(&self) -> AppResult<ReconcileReport> {
        let items = self.catalog.list_equipment().await?;
        let mut report = ReconcileReport {
            checked: items.len(),
            ..Default::default()
        };

        for item in items {
            let _guard = self.locks.acquire([ResourceKey::Equipment(item.id)]).await;

            let Some(count) = self.bookings.recount_stock(item.id).await? else {
                continue;
            };
            if count.drifted() {
                let expected = count.expected();
                warn!(
                    equipment_id = %item.id,
                    name = %item.name,
                    counter = count.counter,
                    expected,
                    held = count.held,
                    delta = i64::from(count.counter) - i64::from(expected),
                    "Stock drift detected, reconciled"
                );
                report.corrections.push(StockDrift {
                    equipment_id: item.id,
                    name: item.name,
                    counter: count.counter,
                    expected,
                });
            }
        }

        if report.drift_detected() {
            info!(
                checked = report.checked,
                corrected = report.corrections.len(),
                "Stock reconciliation completed"
            );
        }
        Ok(report)
    }

    /// Reconciles once at startup to recover from crashes.
    pub async fn startup_recovery(&self) -> AppResult<ReconcileReport> {
        info!("Running startup stock recovery");

        let report = self.reconcile().await?;

        if report.drift_detected() {
            info!(
                corrected = report.corrections.len(),
                "Startup recovery corrected stock drift"
            );
        } else {
            info!("Startup recovery: stock counters are consistent");
        }

        Ok(report)
    }

    /// Reconciles every `every` until the cancel signal is received. A
    /// failed pass is logged and retried on the next tick.
    pub async fn run(&self, every: Duration, mut cancel: watch::Receiver<bool>) {
        info!(interval_secs = every.as_secs(), "Stock reconciler started");

        let mut ticker = time::interval(every);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        info!("Stock reconciler received shutdown signal");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.reconcile().await {
                        error!(error = %e, "Stock reconciliation failed");
                    }
                }
            }
        }

        info!("Stock reconciler stopped");
    }
}
