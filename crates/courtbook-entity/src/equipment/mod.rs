//! Rental equipment domain entities.

pub mod kind;
pub mod model;

pub use kind::{EquipmentCondition, EquipmentKind};
pub use model::Equipment;
