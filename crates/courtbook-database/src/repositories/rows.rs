//! Row shapes for the PostgreSQL tables and their conversion into entities.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use courtbook_core::error::{AppError, ErrorKind};
use courtbook_core::result::AppResult;
use courtbook_entity::booking::{
    Booking, BookingResources, BookingStatus, ContactInfo, EquipmentLine,
};
use courtbook_entity::coach::Coach;
use courtbook_entity::court::{Court, CourtType, Sport};
use courtbook_entity::equipment::{Equipment, EquipmentCondition, EquipmentKind};
use courtbook_entity::pricing::{PricingBreakdown, PricingRule, RuleCondition};

/// Convert a non-negative integer column into a count.
pub(crate) fn to_count(value: i32, column: &str) -> AppResult<u32> {
    u32::try_from(value).map_err(|_| {
        AppError::new(
            ErrorKind::Database,
            format!("Column {column} holds negative value {value}"),
        )
    })
}

/// Convert a count into an integer column value.
pub(crate) fn to_column(value: u32, column: &str) -> AppResult<i32> {
    i32::try_from(value).map_err(|_| {
        AppError::validation(format!("{column} value {value} is too large"))
    })
}

#[derive(Debug, FromRow)]
pub(crate) struct CourtRow {
    pub id: Uuid,
    pub name: String,
    pub court_type: CourtType,
    pub sport: Sport,
    pub base_price: f64,
    pub is_active: bool,
    pub description: Option<String>,
    pub amenities: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CourtRow> for Court {
    fn from(row: CourtRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            court_type: row.court_type,
            sport: row.sport,
            base_price: row.base_price,
            is_active: row.is_active,
            description: row.description,
            amenities: row.amenities,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct EquipmentRow {
    pub id: Uuid,
    pub name: String,
    pub kind: EquipmentKind,
    pub sport: Option<Sport>,
    pub total_stock: i32,
    pub available_stock: i32,
    pub rental_price: f64,
    pub is_active: bool,
    pub condition: EquipmentCondition,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EquipmentRow> for Equipment {
    type Error = AppError;

    fn try_from(row: EquipmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            name: row.name,
            kind: row.kind,
            sport: row.sport,
            total_stock: to_count(row.total_stock, "total_stock")?,
            available_stock: to_count(row.available_stock, "available_stock")?,
            rental_price: row.rental_price,
            is_active: row.is_active,
            condition: row.condition,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CoachRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specializations: Vec<String>,
    pub hourly_rate: f64,
    pub is_active: bool,
    pub bio: Option<String>,
    pub certifications: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CoachRow> for Coach {
    type Error = AppError;

    fn try_from(row: CoachRow) -> Result<Self, Self::Error> {
        let specializations = row
            .specializations
            .iter()
            .map(|s| s.parse::<Sport>())
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Self {
            id: row.id.into(),
            name: row.name,
            email: row.email,
            phone: row.phone,
            specializations,
            hourly_rate: row.hourly_rate,
            is_active: row.is_active,
            bio: row.bio,
            certifications: row.certifications,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct PricingRuleRow {
    pub id: Uuid,
    pub name: String,
    pub condition: serde_json::Value,
    pub multiplier: f64,
    pub surcharge: f64,
    pub priority: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PricingRuleRow> for PricingRule {
    type Error = AppError;

    fn try_from(row: PricingRuleRow) -> Result<Self, Self::Error> {
        let condition: RuleCondition = serde_json::from_value(row.condition)?;
        Ok(Self {
            id: row.id.into(),
            name: row.name,
            condition,
            multiplier: row.multiplier,
            surcharge: row.surcharge,
            priority: to_count(row.priority, "priority")?,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct BookingRow {
    pub id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub court_id: Uuid,
    pub coach_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub base_price: f64,
    pub peak_hour_fee: f64,
    pub weekend_fee: f64,
    pub equipment_fee: f64,
    pub coach_fee: f64,
    pub total: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingRow {
    /// Assemble the entity from this row and its equipment lines.
    pub fn into_booking(self, equipment: Vec<EquipmentLine>) -> Booking {
        Booking {
            id: self.id.into(),
            user: ContactInfo::new(self.user_name, self.user_email, self.user_phone),
            court_id: self.court_id.into(),
            start_time: self.start_time,
            end_time: self.end_time,
            resources: BookingResources {
                equipment,
                coach: self.coach_id.map(Into::into),
            },
            status: self.status,
            pricing_breakdown: PricingBreakdown {
                base_price: self.base_price,
                peak_hour_fee: self.peak_hour_fee,
                weekend_fee: self.weekend_fee,
                equipment_fee: self.equipment_fee,
                coach_fee: self.coach_fee,
                total: self.total,
            },
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct EquipmentLineRow {
    pub booking_id: Uuid,
    pub equipment_id: Uuid,
    pub quantity: i32,
}

impl TryFrom<EquipmentLineRow> for EquipmentLine {
    type Error = AppError;

    fn try_from(row: EquipmentLineRow) -> Result<Self, Self::Error> {
        Ok(Self::new(
            row.equipment_id.into(),
            to_count(row.quantity, "quantity")?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_conversions() {
        assert_eq!(to_count(3, "quantity").unwrap(), 3);
        assert_eq!(
            to_count(-1, "quantity").unwrap_err().kind,
            ErrorKind::Database
        );
        assert_eq!(to_column(7, "total_stock").unwrap(), 7);
        assert!(to_column(u32::MAX, "total_stock").is_err());
    }

    #[test]
    fn test_rule_condition_from_json() {
        let row = PricingRuleRow {
            id: Uuid::new_v4(),
            name: "Weekend Rate".to_string(),
            condition: serde_json::json!({"type": "weekend", "days_of_week": [0, 6]}),
            multiplier: 1.25,
            surcharge: 0.0,
            priority: 2,
            is_active: true,
            created_at: Utc::now(),
        };
        let rule = PricingRule::try_from(row).unwrap();
        assert_eq!(
            rule.condition,
            RuleCondition::Weekend {
                days_of_week: vec![0, 6]
            }
        );
        assert_eq!(rule.priority, 2);
    }
}
