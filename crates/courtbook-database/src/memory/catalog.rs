use async_trait::async_trait;
use chrono::Utc;

use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::id::{CoachId, CourtId, EquipmentId};
use courtbook_entity::coach::Coach;
use courtbook_entity::court::Court;
use courtbook_entity::equipment::Equipment;

use super::MemoryStore;
use crate::store::CatalogStore;

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_court(&self, id: CourtId) -> AppResult<Option<Court>> {
        Ok(self.inner.read().await.courts.get(&id).cloned())
    }

    async fn list_courts(&self) -> AppResult<Vec<Court>> {
        let inner = self.inner.read().await;
        let mut courts: Vec<Court> = inner.courts.values().cloned().collect();
        courts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(courts)
    }

    async fn upsert_court(&self, court: &Court) -> AppResult<Court> {
        court.validate()?;
        let mut inner = self.inner.write().await;
        inner.courts.insert(court.id, court.clone());
        Ok(court.clone())
    }

    async fn find_equipment(&self, id: EquipmentId) -> AppResult<Option<Equipment>> {
        Ok(self.inner.read().await.equipment.get(&id).cloned())
    }

    async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        let inner = self.inner.read().await;
        let mut items: Vec<Equipment> = inner.equipment.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn upsert_equipment(&self, equipment: &Equipment) -> AppResult<Equipment> {
        equipment.validate()?;
        let mut inner = self.inner.write().await;
        inner.equipment.insert(equipment.id, equipment.clone());
        Ok(equipment.clone())
    }

    async fn set_available_stock(&self, id: EquipmentId, available: u32) -> AppResult<Equipment> {
        let mut inner = self.inner.write().await;
        let item = inner
            .equipment
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Equipment {id} not found")))?;
        if available > item.total_stock {
            return Err(AppError::validation(format!(
                "Available stock ({available}) cannot exceed total stock ({})",
                item.total_stock
            )));
        }
        item.available_stock = available;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn find_coach(&self, id: CoachId) -> AppResult<Option<Coach>> {
        Ok(self.inner.read().await.coaches.get(&id).cloned())
    }

    async fn list_coaches(&self) -> AppResult<Vec<Coach>> {
        let inner = self.inner.read().await;
        let mut coaches: Vec<Coach> = inner.coaches.values().cloned().collect();
        coaches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(coaches)
    }

    async fn upsert_coach(&self, coach: &Coach) -> AppResult<Coach> {
        coach.validate()?;
        let mut inner = self.inner.write().await;
        inner.coaches.insert(coach.id, coach.clone());
        Ok(coach.clone())
    }
}
