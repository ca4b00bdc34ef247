//! Shared test helpers for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};

use courtbook_core::config::BookingConfig;
use courtbook_database::MemoryStore;
use courtbook_database::store::{CatalogStore, PricingRuleStore};
use courtbook_entity::booking::{ContactInfo, EquipmentLine};
use courtbook_entity::coach::Coach;
use courtbook_entity::court::{Court, CourtType, Sport};
use courtbook_entity::equipment::{Equipment, EquipmentKind};
use courtbook_entity::pricing::PricingRule;
use courtbook_service::BookingEngine;
use courtbook_service::booking::BookingRequest;

/// Test application context
pub struct TestApp {
    /// Engine under test
    pub engine: BookingEngine,
    /// Backing store, for direct inspection
    pub store: MemoryStore,
}

impl TestApp {
    /// Create an engine over an empty store
    pub fn new() -> Self {
        Self::with_config(BookingConfig::default())
    }

    /// Create an engine over an empty store with the given config
    pub fn with_config(config: BookingConfig) -> Self {
        let store = MemoryStore::new();
        let engine = BookingEngine::in_memory(store.clone(), config);
        Self { engine, store }
    }

    /// Create an engine over the sample catalog
    pub async fn seeded() -> Self {
        let app = Self::new();
        app.engine.seed(false).await.expect("Failed to seed catalog");
        app
    }

    /// A second engine over the same store with its own admission locks,
    /// standing in for another process
    pub fn second_engine(&self) -> BookingEngine {
        BookingEngine::in_memory(self.store.clone(), self.engine.config().clone())
    }

    /// Find a seeded court by name
    pub async fn court(&self, name: &str) -> Court {
        self.store
            .list_courts()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("No court named {name}"))
    }

    /// Find a seeded coach by name
    pub async fn coach(&self, name: &str) -> Coach {
        self.store
            .list_coaches()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("No coach named {name}"))
    }

    /// Find a seeded equipment item by name
    pub async fn equipment(&self, name: &str) -> Equipment {
        self.store
            .list_equipment()
            .await
            .unwrap()
            .into_iter()
            .find(|e| e.name == name)
            .unwrap_or_else(|| panic!("No equipment named {name}"))
    }

    /// Add a court
    pub async fn add_court(&self, court_type: CourtType, base_price: f64) -> Court {
        let court = Court::new("Test Court", court_type, Sport::Badminton, base_price);
        self.store.upsert_court(&court).await.unwrap()
    }

    /// Add an equipment item with the given stock
    pub async fn add_equipment(&self, total_stock: u32, rental_price: f64) -> Equipment {
        let item = Equipment::new(
            "Test Racket",
            EquipmentKind::Racket,
            Some(Sport::Badminton),
            total_stock,
            rental_price,
        );
        self.store.upsert_equipment(&item).await.unwrap()
    }

    /// Add a coach
    pub async fn add_coach(&self, hourly_rate: f64) -> Coach {
        let coach = Coach::new(
            "Test Coach",
            "coach@example.com",
            "+1-555-0100",
            vec![Sport::Badminton],
            hourly_rate,
        );
        self.store.upsert_coach(&coach).await.unwrap()
    }

    /// Add a pricing rule
    pub async fn add_rule(&self, rule: PricingRule) {
        self.store.upsert_rule(&rule).await.unwrap();
    }

    /// Current available counter of an item
    pub async fn available_stock(&self, item: &Equipment) -> u32 {
        self.store
            .find_equipment(item.id)
            .await
            .unwrap()
            .unwrap()
            .available_stock
    }
}

/// A UTC instant on a March 2025 day (1st is a Saturday, 4th a Tuesday)
pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, hour, minute, 0).unwrap()
}

/// A one-hour booking request with test contact details
pub fn request(court: &Court, start: DateTime<Utc>) -> BookingRequest {
    request_for(court, start, start + Duration::hours(1))
}

/// A booking request with test contact details
pub fn request_for(court: &Court, start: DateTime<Utc>, end: DateTime<Utc>) -> BookingRequest {
    BookingRequest {
        user: ContactInfo::new("Test Player", "player@example.com", "+1-555-0199"),
        court_id: court.id,
        start_time: start,
        end_time: end,
        equipment: Vec::new(),
        coach_id: None,
        notes: None,
    }
}

/// Request `quantity` units of `item`
pub fn line(item: &Equipment, quantity: u32) -> EquipmentLine {
    EquipmentLine::new(item.id, quantity)
}
