//! Integration tests for concurrent admissions.

mod helpers;

use futures::future::join_all;

use courtbook_core::config::{BookingConfig, DatabaseConfig};
use courtbook_core::error::ErrorKind;
use courtbook_core::result::AppResult;
use courtbook_core::types::pagination::PageRequest;
use courtbook_database::DatabasePool;
use courtbook_database::migration::run_migrations;
use courtbook_database::store::CatalogStore;
use courtbook_entity::booking::{Booking, BookingStatus};
use courtbook_entity::coach::Coach;
use courtbook_entity::court::{Court, CourtType, Sport};
use courtbook_entity::equipment::{Equipment, EquipmentKind};
use courtbook_service::{BookingEngine, BookingQuery};
use courtbook_service::booking::BookingRequest;

use helpers::{TestApp, at, line, request};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_coach_on_two_courts_admits_one() {
    let app = TestApp::seeded().await;
    let coach = app.coach("John Smith").await;
    let courts = [
        app.court("Court A - Premium Indoor").await,
        app.court("Court B - Standard Indoor").await,
    ];

    let tasks = courts.iter().map(|court| {
        let engine = app.engine.clone();
        let mut req = request(court, at(4, 18, 0));
        req.coach_id = Some(coach.id);
        tokio::spawn(async move { engine.create_booking(req).await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let admitted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(admitted, 1);
    let refused: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();
    assert_eq!(refused.len(), 1);
    assert_eq!(refused[0].kind, ErrorKind::Conflict);
    let availability = refused[0].availability.as_ref().unwrap();
    assert!(availability.court);
    assert!(!availability.coach);

    let confirmed = app
        .engine
        .list_bookings(
            &BookingQuery {
                status: Some(BookingStatus::Confirmed),
                ..Default::default()
            },
            &PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(confirmed.total_items, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_court_many_requests_admits_one() {
    let app = TestApp::new();
    let court = app
        .add_court(courtbook_entity::court::CourtType::Indoor, 20.0)
        .await;

    let tasks = (0..16).map(|_| {
        let engine = app.engine.clone();
        let req = request(&court, at(4, 10, 0));
        tokio::spawn(async move { engine.create_booking(req).await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.kind == ErrorKind::Conflict)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_equipment_never_goes_negative() {
    let app = TestApp::seeded().await;
    let shuttles = app.equipment("Shuttlecocks (Tube of 6)").await;
    let mut courts = Vec::new();
    for name in [
        "Court A - Premium Indoor",
        "Court B - Standard Indoor",
        "Court C - Outdoor",
        "Court D - Tennis Court 1",
    ] {
        courts.push(app.court(name).await);
    }

    // 50 tubes; four simultaneous requests for 20 each.
    let tasks = courts.iter().map(|court| {
        let engine = app.engine.clone();
        let mut req = request(court, at(4, 9, 0));
        req.equipment = vec![line(&shuttles, 20)];
        tokio::spawn(async move { engine.create_booking(req).await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let admitted = results.iter().filter(|r| r.is_ok()).count() as u32;
    assert!(admitted >= 1);
    assert!(admitted * 20 <= 50);
    assert_eq!(app.available_stock(&shuttles).await, 50 - admitted * 20);

    let report = app.engine.reconciler().reconcile().await.unwrap();
    assert!(!report.drift_detected());
}

/// Run every request on its own task, alternating between engines.
async fn race(engines: &[BookingEngine], requests: Vec<BookingRequest>) -> Vec<AppResult<Booking>> {
    let tasks = requests.into_iter().enumerate().map(|(i, req)| {
        let engine = engines[i % engines.len()].clone();
        tokio::spawn(async move { engine.create_booking(req).await })
    });
    join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_engines_with_separate_locks_admit_one_coach_booking() {
    let app = TestApp::new();
    let engines = [app.engine.clone(), app.second_engine()];
    let coach = app.add_coach(30.0).await;

    for round in 0..20 {
        let courts = [
            app.add_court(CourtType::Indoor, 20.0).await,
            app.add_court(CourtType::Indoor, 20.0).await,
        ];
        let start = at(4, 6, 0) + chrono::Duration::hours(round);
        let requests = courts
            .iter()
            .map(|court| {
                let mut req = request(court, start);
                req.coach_id = Some(coach.id);
                req
            })
            .collect();

        let results = race(&engines, requests).await;
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let refused = results
            .iter()
            .find_map(|r| r.as_ref().err())
            .expect("one request refused");
        assert_eq!(refused.kind, ErrorKind::Conflict);
        let availability = refused.availability.as_deref().expect("availability attached");
        assert!(availability.court);
        assert!(!availability.coach);
    }

    let confirmed = app
        .engine
        .list_bookings(
            &BookingQuery {
                status: Some(BookingStatus::Confirmed),
                ..Default::default()
            },
            &PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(confirmed.total_items, 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_engines_with_separate_locks_admit_one_court_booking() {
    let app = TestApp::new();
    let engines = [app.engine.clone(), app.second_engine()];
    let court = app.add_court(CourtType::Outdoor, 15.0).await;

    let requests = (0..16).map(|_| request(&court, at(4, 10, 0))).collect();
    let results = race(&engines, requests).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.kind == ErrorKind::Conflict)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reconcile_races_admissions_without_drift() {
    let app = TestApp::new();
    let other = app.second_engine();
    let item = app.add_equipment(40, 2.0).await;
    let mut courts = Vec::new();
    for _ in 0..8 {
        courts.push(app.add_court(CourtType::Indoor, 20.0).await);
    }

    let requests: Vec<_> = courts
        .iter()
        .zip(8..)
        .map(|(court, hour)| {
            let mut req = request(court, at(4, hour, 0));
            req.equipment = vec![line(&item, 3)];
            req
        })
        .collect();
    let reconciler = other.reconciler().clone();
    let sweeps = tokio::spawn(async move {
        for _ in 0..10 {
            reconciler.reconcile().await.unwrap();
            tokio::task::yield_now().await;
        }
    });
    let results = race(&[app.engine.clone()], requests).await;
    sweeps.await.unwrap();

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(app.available_stock(&item).await, 40 - 8 * 3);
    let report = app.engine.reconciler().reconcile().await.unwrap();
    assert!(!report.drift_detected());
}

/// Two pools stand in for two CLI processes sharing one database.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires a PostgreSQL database in DATABASE_URL"]
async fn test_postgres_processes_admit_one_coach_booking() {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        return;
    };
    let config = DatabaseConfig {
        url,
        max_connections: 4,
        min_connections: 1,
        acquire_timeout_seconds: 10,
        idle_timeout_seconds: 60,
    };
    let first = DatabasePool::connect(&config).await.unwrap();
    let second = DatabasePool::connect(&config).await.unwrap();
    run_migrations(first.pool()).await.unwrap();

    let catalog = first.catalog();
    let mut coach = Coach::new("Race Coach", "", "+1-555-0100", vec![Sport::Tennis], 30.0);
    coach.email = format!("{}@example.com", coach.id);
    let coach = catalog.upsert_coach(&coach).await.unwrap();
    let item = catalog
        .upsert_equipment(&Equipment::new("Race Balls", EquipmentKind::Ball, None, 5, 1.0))
        .await
        .unwrap();
    let mut requests = Vec::new();
    for _ in 0..4 {
        let court = catalog
            .upsert_court(&Court::new("Race Court", CourtType::Outdoor, Sport::Tennis, 15.0))
            .await
            .unwrap();
        let mut req = request(&court, at(4, 10, 0));
        req.coach_id = Some(coach.id);
        req.equipment = vec![line(&item, 2)];
        requests.push(req);
    }

    let engines = [
        BookingEngine::postgres(&first, BookingConfig::default()),
        BookingEngine::postgres(&second, BookingConfig::default()),
    ];
    let results = race(&engines, requests).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.kind == ErrorKind::Conflict)
    );
    let stored = catalog.find_equipment(item.id).await.unwrap().unwrap();
    assert_eq!(stored.available_stock, 3);
}
