//! Equipment kind and condition enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What sort of item a piece of rental equipment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "equipment_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EquipmentKind {
    /// Racket.
    Racket,
    /// Shoes.
    Shoes,
    /// Ball or shuttlecock.
    Ball,
    /// Net.
    Net,
    /// Anything else.
    Other,
}

impl EquipmentKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Racket => "racket",
            Self::Shoes => "shoes",
            Self::Ball => "ball",
            Self::Net => "net",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EquipmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Physical condition of a rental item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "equipment_condition", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EquipmentCondition {
    /// Excellent.
    Excellent,
    /// Good.
    #[default]
    Good,
    /// Fair.
    Fair,
    /// Poor.
    Poor,
}

impl EquipmentCondition {
    /// Return the condition as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

impl fmt::Display for EquipmentCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
