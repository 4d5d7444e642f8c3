//! The top-spenders report over stored purchase histories.

mod common;

use common::*;
use maskstore_core::purchase::PurchaseItem;
use maskstore_core::ErrorKind;

#[tokio::test]
async fn test_top_spender_wins_with_top_n_one() {
    let db = setup().await;
    let a = add_user(&db, "Alice", 0).await;
    let b = add_user(&db, "Bob", 0).await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    add_history(&db, &b, &north, 300, "2024-03-01T10:00:00Z").await;
    add_history(&db, &a, &north, 200, "2024-03-02T10:00:00Z").await;
    add_history(&db, &a, &north, 300, "2024-03-03T10:00:00Z").await;

    let report = db
        .analytics()
        .get_top_spenders("2024-03-01", "2024-03-31", 1)
        .await
        .unwrap();

    assert_eq!(report.actual_count, 1);
    assert_eq!(report.top_n, 1);
    let top = &report.top_spenders[0];
    assert_eq!(top.user_id, a.id);
    assert_eq!(top.name, "Alice");
    assert_eq!(top.total_spending_cents, 500);
    assert_eq!(top.total_transactions, 2);
    assert_eq!(top.purchase_records.len(), 2);
    assert_eq!(report.date_range.start_date, "2024-03-01");
}

#[tokio::test]
async fn test_range_bounds_are_inclusive_and_date_only_end_covers_the_day() {
    let db = setup().await;
    let a = add_user(&db, "Alice", 0).await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    add_history(&db, &a, &north, 100, "2024-03-01T00:00:00Z").await;
    add_history(&db, &a, &north, 100, "2024-03-31T23:59:59Z").await;
    add_history(&db, &a, &north, 100, "2024-04-01T00:00:00Z").await;
    add_history(&db, &a, &north, 100, "2024-02-29T23:59:59Z").await;

    let report = db
        .analytics()
        .get_top_spenders("2024-03-01", "2024-03-31", 10)
        .await
        .unwrap();

    assert_eq!(report.top_spenders.len(), 1);
    assert_eq!(report.top_spenders[0].total_spending_cents, 200);
    assert_eq!(report.top_spenders[0].total_transactions, 2);
}

#[tokio::test]
async fn test_records_carry_pharmacy_and_line_items() {
    let db = setup().await;
    let a = add_user(&db, "Alice", 10_000).await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let green = add_mask(&db, "MaskT", "green", 10).await;
    add_stock(&db, &north, &green, 250, 10).await;

    db.transactions()
        .process_bulk_purchase(
            &a.id,
            vec![PurchaseItem {
                pharmacy_id: north.id.clone(),
                mask_type_id: green.id.clone(),
                quantity: 2,
            }],
        )
        .await
        .unwrap();

    let report = db
        .analytics()
        .get_top_spenders("2000-01-01", "2999-12-31", 5)
        .await
        .unwrap();

    let record = &report.top_spenders[0].purchase_records[0];
    assert_eq!(record.pharmacy_name, "North Pharmacy");
    assert_eq!(record.transaction_amount_cents, 500);
    assert_eq!(record.purchase_details.len(), 1);
    assert_eq!(record.purchase_details[0].mask_type.id, green.id);
    assert_eq!(record.purchase_details[0].total_price_cents, 500);
}

#[tokio::test]
async fn test_invalid_ranges_and_top_n_are_rejected() {
    let db = setup().await;
    let engine = db.analytics();

    let err = engine
        .get_top_spenders("2024-03-31", "2024-03-01", 5)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = engine.get_top_spenders("yesterday", "2024-03-01", 5).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = engine
        .get_top_spenders("2024-03-01", "2024-03-31", 0)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = engine
        .get_top_spenders("2024-03-01", "2024-03-31", 101)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}
