//! Integration tests for price quotes and booking prices.

mod helpers;

use courtbook_core::error::ErrorKind;
use courtbook_core::types::id::EquipmentId;
use courtbook_entity::booking::EquipmentLine;
use courtbook_entity::court::CourtType;
use courtbook_entity::pricing::{ClockTime, PricingRule, RuleCondition};

use helpers::{TestApp, at, line, request};

#[tokio::test]
async fn test_saturday_evening_on_premium_indoor_court() {
    let app = TestApp::seeded().await;
    let court = app.court("Court A - Premium Indoor").await;

    let quote = app
        .engine
        .calculate_price(court.id, at(1, 18, 0), at(1, 19, 0), &[], None)
        .await
        .unwrap();
    assert_eq!(quote.base_price, 25.0);
    assert_eq!(quote.peak_hour_fee, 12.5);
    assert_eq!(quote.weekend_fee, 6.25);
    assert_eq!(quote.equipment_fee, 0.0);
    assert_eq!(quote.coach_fee, 0.0);
    assert_eq!(quote.total, 48.75);
    assert_eq!(quote.unitemized(), 5.0);

    let booking = app
        .engine
        .create_booking(request(&court, at(1, 18, 0)))
        .await
        .unwrap();
    assert_eq!(booking.pricing_breakdown, quote);
}

#[tokio::test]
async fn test_two_matching_peak_rules() {
    let app = TestApp::new();
    let court = app.add_court(CourtType::Outdoor, 20.0).await;
    let window = || RuleCondition::PeakHour {
        start_time: ClockTime::new(18, 0).unwrap(),
        end_time: ClockTime::new(21, 0).unwrap(),
    };
    app.add_rule(PricingRule::new("Evening", window(), 1).with_multiplier(1.5))
        .await;
    app.add_rule(PricingRule::new("Evening flat", window(), 2).with_surcharge(3.0))
        .await;

    let quote = app
        .engine
        .calculate_price(court.id, at(4, 19, 0), at(4, 20, 0), &[], None)
        .await
        .unwrap();
    // The field keeps the last-evaluated fee; the total keeps both.
    assert_eq!(quote.peak_hour_fee, 3.0);
    assert_eq!(quote.total, 20.0 + 10.0 + 3.0);
}

#[tokio::test]
async fn test_quote_is_deterministic() {
    let app = TestApp::seeded().await;
    let court = app.court("Court D - Tennis Court 1").await;
    let coach = app.coach("Mike Wilson").await;
    let rackets = app.equipment("Tennis Racket").await;
    let balls = app.equipment("Tennis Balls (3 pack)").await;
    let lines = [line(&rackets, 2), line(&balls, 1)];

    let first = app
        .engine
        .calculate_price(court.id, at(2, 19, 0), at(2, 21, 0), &lines, Some(coach.id))
        .await
        .unwrap();
    let second = app
        .engine
        .calculate_price(court.id, at(2, 19, 0), at(2, 21, 0), &lines, Some(coach.id))
        .await
        .unwrap();
    assert_eq!(first, second);

    // Sunday 19:00, outdoor: peak 17.5 + weekend 8.75, rackets 16 + balls 2,
    // coach rate charged once for the two hours.
    assert_eq!(first.peak_hour_fee, 17.5);
    assert_eq!(first.weekend_fee, 8.75);
    assert_eq!(first.equipment_fee, 18.0);
    assert_eq!(first.coach_fee, 40.0);
    assert_eq!(first.total, 35.0 + 17.5 + 8.75 + 18.0 + 40.0);
}

#[tokio::test]
async fn test_inactive_rules_are_ignored() {
    let app = TestApp::new();
    let court = app.add_court(CourtType::Indoor, 20.0).await;
    let mut rule = PricingRule::new(
        "Indoor",
        RuleCondition::CourtType {
            applicable_court_types: vec![CourtType::Indoor],
        },
        1,
    )
    .with_surcharge(5.0);
    rule.is_active = false;
    app.add_rule(rule).await;

    let quote = app
        .engine
        .calculate_price(court.id, at(4, 10, 0), at(4, 11, 0), &[], None)
        .await
        .unwrap();
    assert_eq!(quote.total, 20.0);
}

#[tokio::test]
async fn test_quote_requires_every_resource() {
    let app = TestApp::seeded().await;
    let court = app.court("Court B - Standard Indoor").await;

    let err = app
        .engine
        .calculate_price(
            court.id,
            at(4, 10, 0),
            at(4, 11, 0),
            &[EquipmentLine::new(EquipmentId::new(), 1)],
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .engine
        .calculate_price(court.id, at(4, 11, 0), at(4, 10, 0), &[], None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInterval);
}
