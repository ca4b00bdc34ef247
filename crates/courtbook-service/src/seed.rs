//! Built-in sample catalog.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_database::store::{CatalogStore, PricingRuleStore, RuleFilter};
use courtbook_entity::coach::Coach;
use courtbook_entity::court::{Court, CourtType, Sport};
use courtbook_entity::equipment::{Equipment, EquipmentCondition, EquipmentKind};
use courtbook_entity::pricing::{ClockTime, PricingRule, RuleCondition};

/// What a seeding run wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Courts written.
    pub courts: usize,
    /// Coaches written.
    pub coaches: usize,
    /// Equipment items written.
    pub equipment: usize,
    /// Pricing rules written.
    pub rules: usize,
    /// Whether seeding was skipped because the catalog was not empty.
    pub skipped: bool,
}

/// Load the sample catalog.
///
/// Does nothing when courts already exist unless `force` is set. Forced runs
/// overwrite sample entries by name, keeping their ids, so they can be
/// repeated; an overwritten item keeps its available counter, capped at the
/// sample total.
pub async fn seed_catalog(
    catalog: &dyn CatalogStore,
    rules: &dyn PricingRuleStore,
    force: bool,
) -> AppResult<SeedReport> {
    let existing_courts = catalog.list_courts().await?;
    if !existing_courts.is_empty() && !force {
        info!(courts = existing_courts.len(), "Catalog already populated, skipping seed");
        return Ok(SeedReport {
            skipped: true,
            ..Default::default()
        });
    }

    let mut report = SeedReport::default();

    let court_ids: HashMap<String, _> = existing_courts
        .into_iter()
        .map(|c| (c.name.clone(), c.id))
        .collect();
    for mut court in sample_courts() {
        if let Some(id) = court_ids.get(&court.name) {
            court.id = *id;
        }
        catalog.upsert_court(&court).await?;
        report.courts += 1;
    }

    let coach_ids: HashMap<String, _> = catalog
        .list_coaches()
        .await?
        .into_iter()
        .map(|c| (c.email.clone(), c.id))
        .collect();
    for mut coach in sample_coaches() {
        if let Some(id) = coach_ids.get(&coach.email) {
            coach.id = *id;
        }
        catalog.upsert_coach(&coach).await?;
        report.coaches += 1;
    }

    let existing_items: HashMap<String, Equipment> = catalog
        .list_equipment()
        .await?
        .into_iter()
        .map(|e| (e.name.clone(), e))
        .collect();
    for mut item in sample_equipment() {
        if let Some(existing) = existing_items.get(&item.name) {
            item.id = existing.id;
            item.available_stock = existing.available_stock.min(item.total_stock);
        }
        catalog.upsert_equipment(&item).await?;
        report.equipment += 1;
    }

    let rule_ids: HashMap<String, _> = rules
        .list_rules(&RuleFilter::default())
        .await?
        .into_iter()
        .map(|r| (r.name.clone(), r.id))
        .collect();
    for mut rule in sample_rules()? {
        if let Some(id) = rule_ids.get(&rule.name) {
            rule.id = *id;
        }
        rules.upsert_rule(&rule).await?;
        report.rules += 1;
    }

    info!(
        courts = report.courts,
        coaches = report.coaches,
        equipment = report.equipment,
        rules = report.rules,
        "Catalog seeded"
    );
    Ok(report)
}

fn court(
    name: &str,
    court_type: CourtType,
    sport: Sport,
    base_price: f64,
    description: &str,
    amenities: &[&str],
) -> Court {
    let mut court = Court::new(name, court_type, sport, base_price);
    court.description = Some(description.to_string());
    court.amenities = amenities.iter().map(|a| a.to_string()).collect();
    court
}

fn sample_courts() -> Vec<Court> {
    vec![
        court(
            "Court A - Premium Indoor",
            CourtType::Indoor,
            Sport::Badminton,
            25.0,
            "Premium indoor badminton court with professional lighting",
            &["LED Lighting", "Air Conditioning", "Scoreboard", "Seating Area"],
        ),
        court(
            "Court B - Standard Indoor",
            CourtType::Indoor,
            Sport::Badminton,
            20.0,
            "Standard indoor badminton court",
            &["Lighting", "Basic Seating"],
        ),
        court(
            "Court C - Outdoor",
            CourtType::Outdoor,
            Sport::Badminton,
            15.0,
            "Outdoor badminton court with natural lighting",
            &["Natural Lighting", "Wind Protection"],
        ),
        court(
            "Court D - Tennis Court 1",
            CourtType::Outdoor,
            Sport::Tennis,
            35.0,
            "Professional tennis court with hard surface",
            &["Hard Surface", "Net", "Fencing", "Night Lighting"],
        ),
    ]
}

fn coach(
    name: &str,
    email: &str,
    phone: &str,
    specializations: Vec<Sport>,
    hourly_rate: f64,
    bio: &str,
    certifications: &[&str],
) -> Coach {
    let mut coach = Coach::new(name, email, phone, specializations, hourly_rate);
    coach.bio = Some(bio.to_string());
    coach.certifications = certifications.iter().map(|c| c.to_string()).collect();
    coach
}

fn sample_coaches() -> Vec<Coach> {
    vec![
        coach(
            "John Smith",
            "john.smith@facility.com",
            "+1-555-0101",
            vec![Sport::Badminton],
            30.0,
            "Certified badminton coach with 10 years of experience",
            &["Badminton Coaching Level 2", "First Aid Certified"],
        ),
        coach(
            "Sarah Johnson",
            "sarah.johnson@facility.com",
            "+1-555-0102",
            vec![Sport::Badminton, Sport::Tennis],
            35.0,
            "Multi-sport coach specializing in racket sports",
            &["Badminton Coaching Level 3", "Tennis Coaching Level 2"],
        ),
        coach(
            "Mike Wilson",
            "mike.wilson@facility.com",
            "+1-555-0103",
            vec![Sport::Tennis],
            40.0,
            "Former professional tennis player turned coach",
            &["Tennis Coaching Level 3", "Sports Psychology"],
        ),
    ]
}

fn sample_equipment() -> Vec<Equipment> {
    let item = |name: &str, kind, sport, total, price, condition| {
        let mut item = Equipment::new(name, kind, Some(sport), total, price);
        item.condition = condition;
        item
    };
    vec![
        item(
            "Professional Badminton Racket",
            EquipmentKind::Racket,
            Sport::Badminton,
            20,
            5.0,
            EquipmentCondition::Excellent,
        ),
        item(
            "Badminton Shoes",
            EquipmentKind::Shoes,
            Sport::Badminton,
            15,
            3.0,
            EquipmentCondition::Good,
        ),
        item(
            "Tennis Racket",
            EquipmentKind::Racket,
            Sport::Tennis,
            10,
            8.0,
            EquipmentCondition::Excellent,
        ),
        item(
            "Tennis Balls (3 pack)",
            EquipmentKind::Ball,
            Sport::Tennis,
            30,
            2.0,
            EquipmentCondition::Good,
        ),
        item(
            "Shuttlecocks (Tube of 6)",
            EquipmentKind::Ball,
            Sport::Badminton,
            50,
            4.0,
            EquipmentCondition::Good,
        ),
    ]
}

fn sample_rules() -> AppResult<Vec<PricingRule>> {
    let peak = RuleCondition::PeakHour {
        start_time: ClockTime::new(18, 0)?,
        end_time: ClockTime::new(21, 0)?,
    };
    let weekend = RuleCondition::Weekend {
        days_of_week: vec![0, 6],
    };
    let indoor = RuleCondition::CourtType {
        applicable_court_types: vec![CourtType::Indoor],
    };
    let rules = vec![
        PricingRule::new("Peak Hour Surcharge", peak, 1).with_multiplier(1.5),
        PricingRule::new("Weekend Surcharge", weekend, 2).with_multiplier(1.25),
        PricingRule::new("Indoor Court Premium", indoor, 3).with_surcharge(5.0),
    ];
    for rule in &rules {
        rule.validate()
            .map_err(|e| AppError::internal(format!("Invalid sample rule: {e}")))?;
    }
    Ok(rules)
}
