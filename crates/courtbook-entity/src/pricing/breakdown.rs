//! Price breakdown embedded in every booking.

use serde::{Deserialize, Serialize};

/// Itemized price of a booking. Every field is non-negative.
///
/// `total` also includes court-type rule fees, which have no field of their
/// own; see [`PricingBreakdown::unitemized`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    /// Court base price.
    pub base_price: f64,
    /// Peak-hour rule fee.
    pub peak_hour_fee: f64,
    /// Weekend rule fee.
    pub weekend_fee: f64,
    /// Equipment rental fees.
    pub equipment_fee: f64,
    /// Coach fee.
    pub coach_fee: f64,
    /// Amount charged.
    pub total: f64,
}

impl PricingBreakdown {
    /// A breakdown holding only the base price.
    pub fn from_base(base_price: f64) -> Self {
        Self {
            base_price,
            total: base_price,
            ..Default::default()
        }
    }

    /// Sum of the itemized fields.
    pub fn itemized(&self) -> f64 {
        self.base_price + self.peak_hour_fee + self.weekend_fee + self.equipment_fee + self.coach_fee
    }

    /// The part of `total` not attributed to any field.
    pub fn unitemized(&self) -> f64 {
        self.total - self.itemized()
    }
}
