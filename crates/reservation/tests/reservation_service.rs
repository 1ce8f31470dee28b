mod common;

use chrono::Duration;
use common::Harness;
use reservation::model::reservation::ReservationStatus;
use shared::{errors::ServiceError, utils::Clock};

const FARMER: i32 = 100;
const ALICE: i32 = 1;
const BOB: i32 = 2;

#[tokio::test]
async fn two_buyers_share_stock_and_cancel_frees_it() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 10).await;

    h.command()
        .upsert_reservation(ALICE, product, 6)
        .await
        .expect("alice reserves 6");

    let for_bob = h
        .query()
        .compute_availability(product, Some(BOB))
        .await
        .expect("availability");
    assert_eq!(for_bob.available_stock, 4);
    assert_eq!(for_bob.requester_reserved, 0);

    let err = h
        .command()
        .upsert_reservation(BOB, product, 5)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock { max_allowed: 4 }));

    h.command()
        .upsert_reservation(BOB, product, 4)
        .await
        .expect("bob reserves 4");

    h.command()
        .cancel_reservation(ALICE, product)
        .await
        .expect("alice cancels");

    let for_bob = h
        .query()
        .compute_availability(product, Some(BOB))
        .await
        .expect("availability");
    assert_eq!(for_bob.available_stock, 10);
    assert_eq!(for_bob.requester_reserved, 4);
}

#[tokio::test]
async fn re_reserving_replaces_quantity_and_refreshes_expiry() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 10).await;

    let first = h
        .command()
        .upsert_reservation(ALICE, product, 3)
        .await
        .expect("first");

    h.clock.advance(Duration::hours(1));

    let second = h
        .command()
        .upsert_reservation(ALICE, product, 5)
        .await
        .expect("second");

    assert_eq!(first.id, second.id);
    assert_eq!(second.quantity, 5);
    assert_eq!(second.expires_at, h.clock.now() + Duration::hours(24));
    assert!(second.expires_at > first.expires_at);

    let rows = h.db.reservations_of(ALICE, product).await;
    let active: Vec<_> = rows
        .iter()
        .filter(|r| r.status == ReservationStatus::Active)
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].quantity, 5);
}

#[tokio::test]
async fn own_reservation_is_reported_back_to_requester() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 8).await;

    h.command()
        .upsert_reservation(ALICE, product, 3)
        .await
        .expect("reserve");

    let own = h
        .query()
        .compute_availability(product, Some(ALICE))
        .await
        .expect("availability");

    assert_eq!(own.total_stock, 8);
    assert_eq!(own.available_stock, 8);
    assert_eq!(own.requester_reserved, 3);

    let anonymous = h
        .query()
        .compute_availability(product, None)
        .await
        .expect("availability");
    assert_eq!(anonymous.available_stock, 5);
    assert_eq!(anonymous.requester_reserved, 0);
}

#[tokio::test]
async fn exact_maximum_succeeds_and_one_more_fails() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 10).await;

    h.command()
        .upsert_reservation(BOB, product, 7)
        .await
        .expect("bob");
    h.command()
        .upsert_reservation(ALICE, product, 1)
        .await
        .expect("alice");

    let view = h
        .query()
        .compute_availability(product, Some(ALICE))
        .await
        .expect("availability");
    assert_eq!(view.available_stock, 3);
    assert_eq!(view.requester_reserved, 1);
    let max = view.available_stock + view.requester_reserved;
    assert_eq!(max, 4);

    let err = h
        .command()
        .upsert_reservation(ALICE, product, max + 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock { max_allowed: 4 }));

    let ok = h
        .command()
        .upsert_reservation(ALICE, product, max)
        .await
        .expect("boundary");
    assert_eq!(ok.quantity, 4);
}

#[tokio::test]
async fn failed_update_leaves_existing_hold_untouched() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 5).await;

    let held = h
        .command()
        .upsert_reservation(ALICE, product, 2)
        .await
        .expect("reserve");

    let err = h
        .command()
        .upsert_reservation(ALICE, product, 8)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock { max_allowed: 7 }));

    let rows = h.db.reservations_of(ALICE, product).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity, 2);
    assert_eq!(rows[0].expires_at, held.expires_at);
}

#[tokio::test]
async fn non_positive_quantity_is_rejected() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 5).await;

    for quantity in [0, -3] {
        let err = h
            .command()
            .upsert_reservation(ALICE, product, quantity)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    assert!(h.db.all_reservations().await.is_empty());
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let h = Harness::new();

    let err = h
        .command()
        .upsert_reservation(ALICE, 404, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = h
        .query()
        .compute_availability(404, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn empty_listing_reports_zero_available() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 0).await;

    let view = h
        .query()
        .compute_availability(product, Some(ALICE))
        .await
        .expect("availability");
    assert_eq!(view.available_stock, 0);

    let err = h
        .command()
        .upsert_reservation(ALICE, product, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock { max_allowed: 0 }));
}

#[tokio::test]
async fn stock_cut_below_holds_clamps_availability_at_zero() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 10).await;

    h.command()
        .upsert_reservation(ALICE, product, 8)
        .await
        .expect("reserve");
    h.products()
        .update_stock(FARMER, product, 3)
        .await
        .expect("farmer cuts stock");

    let view = h
        .query()
        .compute_availability(product, Some(BOB))
        .await
        .expect("availability");
    assert_eq!(view.total_stock, 3);
    assert_eq!(view.available_stock, 0);
}

#[tokio::test]
async fn cancelling_twice_is_not_found_and_changes_nothing() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 10).await;

    h.command()
        .upsert_reservation(ALICE, product, 2)
        .await
        .expect("reserve");

    let cancelled = h
        .command()
        .cancel_reservation(ALICE, product)
        .await
        .expect("first cancel");
    assert_eq!(cancelled.status, ReservationStatus::Cancelled);

    let err = h
        .command()
        .cancel_reservation(ALICE, product)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let rows = h.db.reservations_of(ALICE, product).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, ReservationStatus::Cancelled);
}

#[tokio::test]
async fn cancel_without_reservation_is_not_found() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 10).await;

    let err = h
        .command()
        .cancel_reservation(ALICE, product)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn reserving_after_cancel_starts_a_new_hold() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 10).await;

    let first = h
        .command()
        .upsert_reservation(ALICE, product, 2)
        .await
        .expect("reserve");
    h.command()
        .cancel_reservation(ALICE, product)
        .await
        .expect("cancel");

    let second = h
        .command()
        .create_reservation(ALICE, product, 4)
        .await
        .expect("reserve again");

    assert_ne!(first.id, second.id);
    assert_eq!(second.status, ReservationStatus::Active);
}

#[tokio::test]
async fn listing_returns_only_live_holds_of_the_caller() {
    let h = Harness::new();
    let apples = h.add_product(FARMER, 10).await;
    let pears = h.add_product(FARMER, 10).await;
    let plums = h.add_product(FARMER, 10).await;

    h.command().upsert_reservation(ALICE, apples, 1).await.expect("apples");
    h.command().upsert_reservation(ALICE, pears, 2).await.expect("pears");
    h.command().upsert_reservation(ALICE, plums, 3).await.expect("plums");
    h.command().upsert_reservation(BOB, apples, 4).await.expect("bob");
    h.command().cancel_reservation(ALICE, plums).await.expect("cancel");

    let mut mine: Vec<_> = h
        .query()
        .list_active_reservations(ALICE)
        .await
        .expect("list")
        .into_iter()
        .map(|r| (r.product_id, r.quantity))
        .collect();
    mine.sort();

    assert_eq!(mine, vec![(apples, 1), (pears, 2)]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reservations_never_exceed_stock() {
    let h = Harness::new();
    let product = h.add_product(FARMER, 10).await;

    let mut tasks = Vec::new();
    for user_id in 1..=20 {
        let command = h.command();
        tasks.push(tokio::spawn(async move {
            command.upsert_reservation(user_id, product, 1).await
        }));
    }

    let mut granted = 0;
    for task in tasks {
        match task.await.expect("task") {
            Ok(_) => granted += 1,
            Err(ServiceError::InsufficientStock { max_allowed }) => assert_eq!(max_allowed, 0),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(granted, 10);

    let view = h
        .query()
        .compute_availability(product, None)
        .await
        .expect("availability");
    assert_eq!(view.available_stock, 0);
}
