//! Equipment entity model and stock bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::id::EquipmentId;

use super::kind::{EquipmentCondition, EquipmentKind};
use crate::court::Sport;

/// A rental equipment line with finite stock.
///
/// `available_stock` is a bookkeeping counter: booking admission decrements
/// it and cancellation restores it. It always stays within
/// `0..=total_stock`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    /// Unique equipment identifier.
    pub id: EquipmentId,
    /// Display name.
    pub name: String,
    /// Kind of item.
    pub kind: EquipmentKind,
    /// Sport the item is for; `None` means general purpose.
    pub sport: Option<Sport>,
    /// Units owned.
    pub total_stock: u32,
    /// Units not held by confirmed bookings.
    pub available_stock: u32,
    /// Rental price per unit per booking.
    pub rental_price: f64,
    /// Whether the item may be newly booked.
    pub is_active: bool,
    /// Physical condition.
    pub condition: EquipmentCondition,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Equipment {
    /// Create a new active item with its whole stock available.
    pub fn new(
        name: impl Into<String>,
        kind: EquipmentKind,
        sport: Option<Sport>,
        total_stock: u32,
        rental_price: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EquipmentId::new(),
            name: name.into(),
            kind,
            sport,
            total_stock,
            available_stock: total_stock,
            rental_price,
            is_active: true,
            condition: EquipmentCondition::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Take `quantity` units out of the available counter.
    ///
    /// Fails with a conflict, leaving the counter untouched, when fewer
    /// units are available.
    pub fn reserve(&mut self, quantity: u32) -> AppResult<()> {
        self.available_stock = self.available_stock.checked_sub(quantity).ok_or_else(|| {
            AppError::conflict(format!(
                "Insufficient stock for '{}': {} requested, {} available",
                self.name, quantity, self.available_stock
            ))
        })?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Return `quantity` units to the available counter, capped at the total.
    pub fn release(&mut self, quantity: u32) {
        self.available_stock = self
            .available_stock
            .saturating_add(quantity)
            .min(self.total_stock);
        self.updated_at = Utc::now();
    }

    /// Check catalog invariants.
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Equipment name is required"));
        }
        if self.available_stock > self.total_stock {
            return Err(AppError::validation(format!(
                "Available stock ({}) cannot exceed total stock ({})",
                self.available_stock, self.total_stock
            )));
        }
        if !self.rental_price.is_finite() || self.rental_price < 0.0 {
            return Err(AppError::validation(
                "Rental price must be a non-negative number",
            ));
        }
        Ok(())
    }
}
