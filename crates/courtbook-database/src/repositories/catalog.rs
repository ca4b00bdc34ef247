//! Resource catalog repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use courtbook_core::error::{AppError, ErrorKind};
use courtbook_core::result::AppResult;
use courtbook_core::types::id::{CoachId, CourtId, EquipmentId};
use courtbook_entity::coach::Coach;
use courtbook_entity::court::Court;
use courtbook_entity::equipment::Equipment;

use super::rows::{CoachRow, CourtRow, EquipmentRow, to_column};
use crate::store::CatalogStore;

/// Repository for courts, equipment, and coaches.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    /// Create a new catalog repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for CatalogRepository {
    async fn find_court(&self, id: CourtId) -> AppResult<Option<Court>> {
        let row = sqlx::query_as::<_, CourtRow>("SELECT * FROM courts WHERE id = $1")
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find court", e))?;
        Ok(row.map(Court::from))
    }

    async fn list_courts(&self) -> AppResult<Vec<Court>> {
        let rows = sqlx::query_as::<_, CourtRow>("SELECT * FROM courts ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list courts", e))?;
        Ok(rows.into_iter().map(Court::from).collect())
    }

    async fn upsert_court(&self, court: &Court) -> AppResult<Court> {
        court.validate()?;
        let row = sqlx::query_as::<_, CourtRow>(
            "INSERT INTO courts (id, name, court_type, sport, base_price, is_active, description, \
             amenities, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, court_type = EXCLUDED.court_type, \
             sport = EXCLUDED.sport, base_price = EXCLUDED.base_price, is_active = EXCLUDED.is_active, \
             description = EXCLUDED.description, amenities = EXCLUDED.amenities, updated_at = NOW() \
             RETURNING *",
        )
        .bind(court.id.into_uuid())
        .bind(&court.name)
        .bind(court.court_type)
        .bind(court.sport)
        .bind(court.base_price)
        .bind(court.is_active)
        .bind(&court.description)
        .bind(&court.amenities)
        .bind(court.created_at)
        .bind(court.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save court", e))?;
        Ok(row.into())
    }

    async fn find_equipment(&self, id: EquipmentId) -> AppResult<Option<Equipment>> {
        sqlx::query_as::<_, EquipmentRow>("SELECT * FROM equipment WHERE id = $1")
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find equipment", e))?
            .map(Equipment::try_from)
            .transpose()
    }

    async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        sqlx::query_as::<_, EquipmentRow>("SELECT * FROM equipment ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list equipment", e))?
            .into_iter()
            .map(Equipment::try_from)
            .collect()
    }

    async fn upsert_equipment(&self, equipment: &Equipment) -> AppResult<Equipment> {
        equipment.validate()?;
        let row = sqlx::query_as::<_, EquipmentRow>(
            "INSERT INTO equipment (id, name, kind, sport, total_stock, available_stock, rental_price, \
             is_active, condition, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, kind = EXCLUDED.kind, \
             sport = EXCLUDED.sport, total_stock = EXCLUDED.total_stock, \
             available_stock = EXCLUDED.available_stock, rental_price = EXCLUDED.rental_price, \
             is_active = EXCLUDED.is_active, condition = EXCLUDED.condition, updated_at = NOW() \
             RETURNING *",
        )
        .bind(equipment.id.into_uuid())
        .bind(&equipment.name)
        .bind(equipment.kind)
        .bind(equipment.sport)
        .bind(to_column(equipment.total_stock, "total_stock")?)
        .bind(to_column(equipment.available_stock, "available_stock")?)
        .bind(equipment.rental_price)
        .bind(equipment.is_active)
        .bind(equipment.condition)
        .bind(equipment.created_at)
        .bind(equipment.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save equipment", e))?;
        row.try_into()
    }

    async fn set_available_stock(&self, id: EquipmentId, available: u32) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, EquipmentRow>(
            "UPDATE equipment SET available_stock = $2, updated_at = NOW() \
             WHERE id = $1 AND total_stock >= $2 RETURNING *",
        )
        .bind(id.into_uuid())
        .bind(to_column(available, "available_stock")?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update available stock", e)
        })?;

        match row {
            Some(row) => row.try_into(),
            None => match self.find_equipment(id).await? {
                Some(item) => Err(AppError::validation(format!(
                    "Available stock ({available}) cannot exceed total stock ({})",
                    item.total_stock
                ))),
                None => Err(AppError::not_found(format!("Equipment {id} not found"))),
            },
        }
    }

    async fn find_coach(&self, id: CoachId) -> AppResult<Option<Coach>> {
        sqlx::query_as::<_, CoachRow>("SELECT * FROM coaches WHERE id = $1")
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find coach", e))?
            .map(Coach::try_from)
            .transpose()
    }

    async fn list_coaches(&self) -> AppResult<Vec<Coach>> {
        sqlx::query_as::<_, CoachRow>("SELECT * FROM coaches ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list coaches", e))?
            .into_iter()
            .map(Coach::try_from)
            .collect()
    }

    async fn upsert_coach(&self, coach: &Coach) -> AppResult<Coach> {
        coach.validate()?;
        let specializations: Vec<&str> = coach.specializations.iter().map(|s| s.as_str()).collect();
        let row = sqlx::query_as::<_, CoachRow>(
            "INSERT INTO coaches (id, name, email, phone, specializations, hourly_rate, is_active, \
             bio, certifications, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, email = EXCLUDED.email, \
             phone = EXCLUDED.phone, specializations = EXCLUDED.specializations, \
             hourly_rate = EXCLUDED.hourly_rate, is_active = EXCLUDED.is_active, bio = EXCLUDED.bio, \
             certifications = EXCLUDED.certifications, updated_at = NOW() \
             RETURNING *",
        )
        .bind(coach.id.into_uuid())
        .bind(&coach.name)
        .bind(&coach.email)
        .bind(&coach.phone)
        .bind(&specializations)
        .bind(coach.hourly_rate)
        .bind(coach.is_active)
        .bind(&coach.bio)
        .bind(&coach.certifications)
        .bind(coach.created_at)
        .bind(coach.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save coach", e))?;
        row.try_into()
    }
}
