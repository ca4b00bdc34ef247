//! Integration tests for booking admission, cancellation, and updates.

mod helpers;

use chrono::NaiveDate;

use courtbook_core::error::ErrorKind;
use courtbook_core::types::id::{BookingId, CoachId};
use courtbook_core::types::pagination::PageRequest;
use courtbook_database::store::CatalogStore;
use courtbook_entity::booking::{BookingStatus, ContactInfo};
use courtbook_entity::court::CourtType;
use courtbook_service::BookingQuery;
use courtbook_service::booking::BookingPatch;

use helpers::{TestApp, at, line, request, request_for};

#[tokio::test]
async fn test_create_reserves_stock_and_prices() {
    let app = TestApp::seeded().await;
    let court = app.court("Court B - Standard Indoor").await;
    let coach = app.coach("John Smith").await;
    let rackets = app.equipment("Professional Badminton Racket").await;

    let mut req = request(&court, at(4, 10, 0));
    req.equipment = vec![line(&rackets, 2)];
    req.coach_id = Some(coach.id);
    req.user = ContactInfo::new("  Ada Lovelace ", "ADA@Example.com", "+1-555-0001");

    let booking = app.engine.create_booking(req).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.user.email, "ada@example.com");
    assert_eq!(booking.user.name, "Ada Lovelace");
    // Base 20, indoor premium 5, rackets 10, coach 30.
    assert_eq!(booking.pricing_breakdown.total, 65.0);
    assert_eq!(app.available_stock(&rackets).await, 18);

    let stored = app.engine.get_booking(booking.id).await.unwrap();
    assert_eq!(stored, booking);
}

#[tokio::test]
async fn test_conflict_carries_availability_and_persists_nothing() {
    let app = TestApp::new();
    let court = app.add_court(CourtType::Indoor, 20.0).await;
    let item = app.add_equipment(10, 5.0).await;
    app.engine
        .create_booking(request(&court, at(4, 10, 0)))
        .await
        .unwrap();

    let mut clash = request_for(&court, at(4, 10, 30), at(4, 11, 30));
    clash.equipment = vec![line(&item, 2)];
    let err = app.engine.create_booking(clash).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    let availability = err.availability.expect("conflict carries availability");
    assert!(!availability.court);
    assert!(availability.equipment[0].available);
    assert_eq!(availability.unavailable_resources(), vec!["court".to_string()]);

    assert_eq!(app.available_stock(&item).await, 10);
    let all = app
        .engine
        .list_bookings(&BookingQuery::default(), &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.items.len(), 1);

    // Touching intervals do not conflict.
    app.engine
        .create_booking(request(&court, at(4, 11, 0)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_double_cancel_restores_stock_once() {
    let app = TestApp::new();
    let court = app.add_court(CourtType::Outdoor, 15.0).await;
    let item = app.add_equipment(5, 2.0).await;

    let mut req = request(&court, at(4, 9, 0));
    req.equipment = vec![line(&item, 2), line(&item, 1)];
    let booking = app.engine.create_booking(req).await.unwrap();
    assert_eq!(app.available_stock(&item).await, 2);

    let cancelled = app.engine.cancel_booking(booking.id).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(app.available_stock(&item).await, 5);

    let err = app.engine.cancel_booking(booking.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyCancelled);
    assert_eq!(app.available_stock(&item).await, 5);

    let err = app.engine.cancel_booking(BookingId::new()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    // The slot is free again.
    app.engine
        .create_booking(request(&court, at(4, 9, 0)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reschedule_is_rechecked() {
    let app = TestApp::new();
    let court = app.add_court(CourtType::Outdoor, 15.0).await;
    let first = app
        .engine
        .create_booking(request(&court, at(4, 10, 0)))
        .await
        .unwrap();
    let second = app
        .engine
        .create_booking(request(&court, at(4, 12, 0)))
        .await
        .unwrap();

    let into_first = BookingPatch {
        start_time: Some(at(4, 10, 30)),
        end_time: Some(at(4, 11, 30)),
        ..Default::default()
    };
    let err = app
        .engine
        .update_booking(second.id, into_first.clone())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    let unchanged = app.engine.get_booking(second.id).await.unwrap();
    assert_eq!(unchanged.start_time, at(4, 12, 0));

    // Overlapping only its own old interval is fine.
    let moved = app
        .engine
        .update_booking(first.id, into_first)
        .await
        .unwrap();
    assert_eq!(moved.start_time, at(4, 10, 30));
    assert_eq!(moved.end_time, at(4, 11, 30));
}

#[tokio::test]
async fn test_update_credits_own_equipment() {
    let app = TestApp::new();
    let court = app.add_court(CourtType::Outdoor, 15.0).await;
    let item = app.add_equipment(5, 2.0).await;

    let mut req = request(&court, at(4, 10, 0));
    req.equipment = vec![line(&item, 3)];
    let booking = app.engine.create_booking(req).await.unwrap();
    assert_eq!(app.available_stock(&item).await, 2);

    let grow = BookingPatch {
        equipment: Some(vec![line(&item, 5)]),
        ..Default::default()
    };
    let grown = app.engine.update_booking(booking.id, grow).await.unwrap();
    assert_eq!(grown.pricing_breakdown.equipment_fee, 10.0);
    assert_eq!(app.available_stock(&item).await, 0);

    let too_many = BookingPatch {
        equipment: Some(vec![line(&item, 6)]),
        ..Default::default()
    };
    let err = app
        .engine
        .update_booking(booking.id, too_many)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(app.available_stock(&item).await, 0);

    let shrink = BookingPatch {
        equipment: Some(vec![line(&item, 1)]),
        ..Default::default()
    };
    app.engine.update_booking(booking.id, shrink).await.unwrap();
    assert_eq!(app.available_stock(&item).await, 4);
}

#[tokio::test]
async fn test_contact_update_keeps_price_and_allocation() {
    let app = TestApp::seeded().await;
    let court = app.court("Court A - Premium Indoor").await;
    let booking = app
        .engine
        .create_booking(request(&court, at(1, 18, 0)))
        .await
        .unwrap();

    let patch = BookingPatch {
        user: Some(ContactInfo::new("Grace", "GRACE@example.com", "+1-555-0002")),
        notes: Some(Some("Bring shuttlecocks".to_string())),
        ..Default::default()
    };
    let updated = app.engine.update_booking(booking.id, patch).await.unwrap();
    assert_eq!(updated.user.email, "grace@example.com");
    assert_eq!(updated.notes.as_deref(), Some("Bring shuttlecocks"));
    assert_eq!(updated.pricing_breakdown, booking.pricing_breakdown);
    assert_eq!(updated.start_time, booking.start_time);
}

#[tokio::test]
async fn test_cancelled_booking_cannot_be_rescheduled() {
    let app = TestApp::new();
    let court = app.add_court(CourtType::Outdoor, 15.0).await;
    let booking = app
        .engine
        .create_booking(request(&court, at(4, 10, 0)))
        .await
        .unwrap();
    app.engine.cancel_booking(booking.id).await.unwrap();

    let patch = BookingPatch {
        start_time: Some(at(4, 14, 0)),
        end_time: Some(at(4, 15, 0)),
        ..Default::default()
    };
    let err = app.engine.update_booking(booking.id, patch).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyCancelled);
}

#[tokio::test]
async fn test_inactive_resources_cannot_be_booked() {
    let app = TestApp::new();
    let mut court = app.add_court(CourtType::Indoor, 20.0).await;
    court.is_active = false;
    app.store.upsert_court(&court).await.unwrap();

    let err = app
        .engine
        .create_booking(request(&court, at(4, 10, 0)))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_invalid_requests() {
    let app = TestApp::new();
    let court = app.add_court(CourtType::Indoor, 20.0).await;

    let inverted = request_for(&court, at(4, 11, 0), at(4, 10, 0));
    let err = app.engine.create_booking(inverted).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInterval);

    let mut no_email = request(&court, at(4, 10, 0));
    no_email.user.email = "   ".to_string();
    let err = app.engine.create_booking(no_email).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let mut other = request(&court, at(4, 10, 0));
    other.coach_id = Some(CoachId::new());
    let err = app.engine.create_booking(other).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_list_by_date_and_status() {
    let app = TestApp::new();
    let court = app.add_court(CourtType::Indoor, 20.0).await;
    let late = app
        .engine
        .create_booking(request(&court, at(4, 20, 0)))
        .await
        .unwrap();
    let early = app
        .engine
        .create_booking(request(&court, at(4, 8, 0)))
        .await
        .unwrap();
    app.engine
        .create_booking(request(&court, at(5, 8, 0)))
        .await
        .unwrap();
    app.engine.cancel_booking(late.id).await.unwrap();

    let on_the_fourth = BookingQuery {
        date: NaiveDate::from_ymd_opt(2025, 3, 4),
        ..Default::default()
    };
    let page = app
        .engine
        .list_bookings(&on_the_fourth, &PageRequest::default())
        .await
        .unwrap();
    let ids: Vec<BookingId> = page.items.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![early.id, late.id]);

    let confirmed = BookingQuery {
        status: Some(BookingStatus::Confirmed),
        ..on_the_fourth
    };
    let page = app
        .engine
        .list_bookings(&confirmed, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, early.id);

    let first_page = app
        .engine
        .list_bookings(&BookingQuery::default(), &PageRequest::new(1, 2))
        .await
        .unwrap();
    assert_eq!(first_page.items.len(), 2);
    assert_eq!(first_page.total_items, 3);
    assert!(first_page.has_next);
    assert!(first_page.items[0].start_time <= first_page.items[1].start_time);
}
