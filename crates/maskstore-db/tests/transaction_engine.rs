//! Purchase, cancellation and administrative writes against a real schema.

mod common;

use common::*;
use maskstore_core::admin::{MaskProductInput, UpsertAction};
use maskstore_core::purchase::PurchaseItem;
use maskstore_core::{CoreError, ErrorKind, TransactionStatus};
use maskstore_db::DbError;

fn item(pharmacy_id: &str, mask_type_id: &str, quantity: i64) -> PurchaseItem {
    PurchaseItem {
        pharmacy_id: pharmacy_id.to_string(),
        mask_type_id: mask_type_id.to_string(),
        quantity,
    }
}

fn product(brand: &str, color: &str, pack_size: i64, price_cents: i64, quantity: i64) -> MaskProductInput {
    MaskProductInput {
        mask_type_id: None,
        brand: brand.to_string(),
        color: color.to_string(),
        pack_size,
        display_name: format!("{brand} ({color}) ({pack_size} per pack)"),
        price_cents,
        quantity,
    }
}

// =============================================================================
// Purchase
// =============================================================================

#[tokio::test]
async fn test_purchase_conserves_money_across_pharmacies() {
    let db = setup().await;
    let alice = add_user(&db, "Alice", 10_000).await;
    let north = add_pharmacy(&db, "North Pharmacy", 1_000).await;
    let south = add_pharmacy(&db, "South Pharmacy", 2_000).await;
    let green = add_mask(&db, "MaskT", "green", 10).await;
    let black = add_mask(&db, "Cotton Kiss", "black", 3).await;
    add_stock(&db, &north, &green, 1_250, 20).await;
    add_stock(&db, &south, &black, 800, 5).await;

    let summary = db
        .transactions()
        .process_bulk_purchase(
            &alice.id,
            vec![item(&north.id, &green.id, 2), item(&south.id, &black.id, 3)],
        )
        .await
        .unwrap();

    assert_eq!(summary.total_amount_cents, 2 * 1_250 + 3 * 800);
    assert_eq!(summary.previous_balance_cents, 10_000);
    assert_eq!(summary.new_balance_cents, 10_000 - 4_900);
    assert_eq!(summary.user_name, "Alice");
    assert_eq!(summary.items.len(), 2);
    assert_eq!(summary.purchase_history_ids.len(), 2);

    assert_eq!(user_balance(&db, &alice.id).await, 5_100);
    let gained = (pharmacy_balance(&db, &north.id).await - 1_000) + (pharmacy_balance(&db, &south.id).await - 2_000);
    assert_eq!(gained, summary.total_amount_cents);

    assert_eq!(stock(&db, &north, &green).await, Some(18));
    assert_eq!(stock(&db, &south, &black).await, Some(2));
    assert_eq!(history_count(&db).await, 2);
}

#[tokio::test]
async fn test_one_history_per_pharmacy() {
    let db = setup().await;
    let alice = add_user(&db, "Alice", 10_000).await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let green = add_mask(&db, "MaskT", "green", 10).await;
    let blue = add_mask(&db, "MaskT", "blue", 10).await;
    add_stock(&db, &north, &green, 100, 10).await;
    add_stock(&db, &north, &blue, 200, 10).await;

    let summary = db
        .transactions()
        .process_bulk_purchase(&alice.id, vec![item(&north.id, &green.id, 1), item(&north.id, &blue.id, 1)])
        .await
        .unwrap();

    assert_eq!(summary.purchase_history_ids.len(), 1);
    assert_eq!(pharmacy_balance(&db, &north.id).await, 300);
}

#[tokio::test]
async fn test_insufficient_funds_leaves_everything_untouched() {
    let db = setup().await;
    let bob = add_user(&db, "Bob", 10).await;
    let north = add_pharmacy(&db, "North Pharmacy", 500).await;
    let green = add_mask(&db, "MaskT", "green", 10).await;
    add_stock(&db, &north, &green, 25, 10).await;

    let err = db
        .transactions()
        .process_bulk_purchase(&bob.id, vec![item(&north.id, &green.id, 2)])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    assert_eq!(user_balance(&db, &bob.id).await, 10);
    assert_eq!(pharmacy_balance(&db, &north.id).await, 500);
    assert_eq!(stock(&db, &north, &green).await, Some(10));
    assert_eq!(history_count(&db).await, 0);
}

#[tokio::test]
async fn test_one_short_item_rejects_the_whole_order() {
    let db = setup().await;
    let alice = add_user(&db, "Alice", 100_000).await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let green = add_mask(&db, "MaskT", "green", 10).await;
    let black = add_mask(&db, "Cotton Kiss", "black", 3).await;
    add_stock(&db, &north, &green, 100, 50).await;
    add_stock(&db, &north, &black, 100, 1).await;

    let err = db
        .transactions()
        .process_bulk_purchase(&alice.id, vec![item(&north.id, &green.id, 5), item(&north.id, &black.id, 2)])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    assert_eq!(user_balance(&db, &alice.id).await, 100_000);
    assert_eq!(stock(&db, &north, &green).await, Some(50));
    assert_eq!(stock(&db, &north, &black).await, Some(1));
}

#[tokio::test]
async fn test_duplicate_lines_count_against_stock_together() {
    let db = setup().await;
    let alice = add_user(&db, "Alice", 100_000).await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let green = add_mask(&db, "MaskT", "green", 10).await;
    add_stock(&db, &north, &green, 100, 5).await;

    let err = db
        .transactions()
        .process_bulk_purchase(&alice.id, vec![item(&north.id, &green.id, 3), item(&north.id, &green.id, 3)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);

    db.transactions()
        .process_bulk_purchase(&alice.id, vec![item(&north.id, &green.id, 2), item(&north.id, &green.id, 3)])
        .await
        .unwrap();
    assert_eq!(stock(&db, &north, &green).await, Some(0));
}

#[tokio::test]
async fn test_stock_never_goes_below_zero() {
    let db = setup().await;
    let alice = add_user(&db, "Alice", 100_000).await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let green = add_mask(&db, "MaskT", "green", 10).await;
    add_stock(&db, &north, &green, 100, 3).await;

    let engine = db.transactions();
    for _ in 0..3 {
        engine
            .process_bulk_purchase(&alice.id, vec![item(&north.id, &green.id, 1)])
            .await
            .unwrap();
    }
    let err = engine
        .process_bulk_purchase(&alice.id, vec![item(&north.id, &green.id, 1)])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    assert_eq!(stock(&db, &north, &green).await, Some(0));
    assert_eq!(user_balance(&db, &alice.id).await, 100_000 - 300);
}

#[tokio::test]
async fn test_overflowing_order_total_is_rejected() {
    let db = setup().await;
    let alice = add_user(&db, "Alice", i64::MAX).await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let green = add_mask(&db, "MaskT", "green", 10).await;
    add_stock(&db, &north, &green, 4_000_000_000_000, 10_000_000).await;

    let err = db
        .transactions()
        .process_bulk_purchase(&alice.id, vec![item(&north.id, &green.id, 10_000_000)])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(user_balance(&db, &alice.id).await, i64::MAX);
    assert_eq!(stock(&db, &north, &green).await, Some(10_000_000));
    assert_eq!(history_count(&db).await, 0);
}

#[tokio::test]
async fn test_missing_stock_record_is_invalid_state() {
    let db = setup().await;
    let alice = add_user(&db, "Alice", 100_000).await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let green = add_mask(&db, "MaskT", "green", 10).await;

    let err = db
        .transactions()
        .process_bulk_purchase(&alice.id, vec![item(&north.id, &green.id, 1)])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert!(matches!(err, DbError::Domain(CoreError::NoStockRecord { .. })));
}

#[tokio::test]
async fn test_purchase_lookups_report_not_found() {
    let db = setup().await;
    let alice = add_user(&db, "Alice", 100_000).await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;

    let engine = db.transactions();
    let err = engine
        .process_bulk_purchase("no-such-user", vec![item(&north.id, "m", 1)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = engine
        .process_bulk_purchase(&alice.id, vec![item(&north.id, "no-such-mask", 1)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = engine.process_bulk_purchase(&alice.id, vec![]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn test_cancel_restores_balances_and_stock() {
    let db = setup().await;
    let alice = add_user(&db, "Alice", 10_000).await;
    let north = add_pharmacy(&db, "North Pharmacy", 1_000).await;
    let green = add_mask(&db, "MaskT", "green", 10).await;
    add_stock(&db, &north, &green, 1_250, 20).await;

    let engine = db.transactions();
    let purchase = engine
        .process_bulk_purchase(&alice.id, vec![item(&north.id, &green.id, 4)])
        .await
        .unwrap();
    let history_id = &purchase.purchase_history_ids[0];

    let cancel = engine.cancel_transaction(&alice.id, history_id).await.unwrap();

    assert_eq!(cancel.user_name, "Alice");
    assert_eq!(cancel.refund_amount_cents, 5_000);
    assert_eq!(cancel.previous_balance_cents, 5_000);
    assert_eq!(cancel.new_balance_cents, 10_000);
    assert_eq!(cancel.status, TransactionStatus::Cancelled);
    assert_eq!(cancel.original_transaction_date, purchase.transaction_date);
    assert_eq!(cancel.items.len(), 1);
    assert!(!cancel.items[0].inventory_recreated);

    assert_eq!(user_balance(&db, &alice.id).await, 10_000);
    assert_eq!(pharmacy_balance(&db, &north.id).await, 1_000);
    assert_eq!(stock(&db, &north, &green).await, Some(20));
}

#[tokio::test]
async fn test_second_cancel_is_invalid_state() {
    let db = setup().await;
    let alice = add_user(&db, "Alice", 10_000).await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let green = add_mask(&db, "MaskT", "green", 10).await;
    add_stock(&db, &north, &green, 100, 20).await;

    let engine = db.transactions();
    let purchase = engine
        .process_bulk_purchase(&alice.id, vec![item(&north.id, &green.id, 1)])
        .await
        .unwrap();
    let history_id = &purchase.purchase_history_ids[0];

    engine.cancel_transaction(&alice.id, history_id).await.unwrap();
    let err = engine.cancel_transaction(&alice.id, history_id).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(user_balance(&db, &alice.id).await, 10_000);
    assert_eq!(stock(&db, &north, &green).await, Some(20));
}

#[tokio::test]
async fn test_cancel_of_someone_elses_history_is_not_found() {
    let db = setup().await;
    let alice = add_user(&db, "Alice", 10_000).await;
    let mallory = add_user(&db, "Mallory", 10_000).await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let green = add_mask(&db, "MaskT", "green", 10).await;
    add_stock(&db, &north, &green, 100, 20).await;

    let engine = db.transactions();
    let purchase = engine
        .process_bulk_purchase(&alice.id, vec![item(&north.id, &green.id, 1)])
        .await
        .unwrap();

    let err = engine
        .cancel_transaction(&mallory.id, &purchase.purchase_history_ids[0])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(user_balance(&db, &mallory.id).await, 10_000);
}

#[tokio::test]
async fn test_cancel_recreates_deleted_stock_row() {
    let db = setup().await;
    let alice = add_user(&db, "Alice", 10_000).await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let green = add_mask(&db, "MaskT", "green", 10).await;
    let row = add_stock(&db, &north, &green, 300, 5).await;

    let engine = db.transactions();
    let purchase = engine
        .process_bulk_purchase(&alice.id, vec![item(&north.id, &green.id, 2)])
        .await
        .unwrap();

    sqlx::query("DELETE FROM inventory WHERE id = ?1")
        .bind(&row.id)
        .execute(db.pool())
        .await
        .unwrap();

    let cancel = engine
        .cancel_transaction(&alice.id, &purchase.purchase_history_ids[0])
        .await
        .unwrap();

    assert!(cancel.items[0].inventory_recreated);
    assert_eq!(stock(&db, &north, &green).await, Some(2));
    assert_eq!(user_balance(&db, &alice.id).await, 10_000);
}

#[tokio::test]
async fn test_cancel_rejected_when_pharmacy_cannot_refund() {
    let db = setup().await;
    let alice = add_user(&db, "Alice", 10_000).await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let green = add_mask(&db, "MaskT", "green", 10).await;
    add_stock(&db, &north, &green, 1_000, 5).await;

    let engine = db.transactions();
    let purchase = engine
        .process_bulk_purchase(&alice.id, vec![item(&north.id, &green.id, 1)])
        .await
        .unwrap();
    engine.update_user_balance(&alice.id, 0, "admin-1").await.unwrap();
    sqlx::query("UPDATE pharmacies SET cash_balance_cents = 0 WHERE id = ?1")
        .bind(&north.id)
        .execute(db.pool())
        .await
        .unwrap();

    let err = engine
        .cancel_transaction(&alice.id, &purchase.purchase_history_ids[0])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    assert!(matches!(err, DbError::Domain(CoreError::PharmacyInsufficientFunds { .. })));
    assert_eq!(user_balance(&db, &alice.id).await, 0);
    assert_eq!(stock(&db, &north, &green).await, Some(4));
}

// =============================================================================
// Administrative Overwrites
// =============================================================================

#[tokio::test]
async fn test_update_user_balance_reports_delta() {
    let db = setup().await;
    let alice = add_user(&db, "Alice", 1_000).await;

    let update = db
        .transactions()
        .update_user_balance(&alice.id, 4_500, "admin-7")
        .await
        .unwrap();

    assert_eq!(update.previous_balance_cents, 1_000);
    assert_eq!(update.new_balance_cents, 4_500);
    assert_eq!(update.delta_cents, 3_500);
    assert_eq!(update.updated_by, "admin-7");
    assert_eq!(user_balance(&db, &alice.id).await, 4_500);

    let err = db
        .transactions()
        .update_user_balance(&alice.id, -1, "admin-7")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = db
        .transactions()
        .update_user_balance("ghost", 10, "admin-7")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_update_inventory_overwrites_quantity() {
    let db = setup().await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let green = add_mask(&db, "MaskT", "green", 10).await;
    let black = add_mask(&db, "Cotton Kiss", "black", 3).await;
    add_stock(&db, &north, &green, 100, 12).await;

    let engine = db.transactions();
    let update = engine.update_inventory(&north.id, &green.id, 4).await.unwrap();

    assert_eq!(update.previous_quantity, 12);
    assert_eq!(update.new_quantity, 4);
    assert_eq!(update.delta, -8);
    assert_eq!(update.pharmacy_name, "North Pharmacy");
    assert_eq!(stock(&db, &north, &green).await, Some(4));

    let err = engine.update_inventory(&north.id, &black.id, 4).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// =============================================================================
// Bulk Upsert
// =============================================================================

#[tokio::test]
async fn test_bulk_upsert_creates_then_updates() {
    let db = setup().await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let engine = db.transactions();

    let first = engine
        .bulk_upsert_mask_products(
            &north.id,
            vec![product("MaskT", "green", 10, 1_250, 30), product("Second Smile", "black", 6, 500, 8)],
        )
        .await
        .unwrap();

    assert_eq!(first.total_processed, 2);
    assert_eq!(first.created_count, 2);
    assert_eq!(first.updated_count, 0);

    let second = engine
        .bulk_upsert_mask_products(&north.id, vec![product("MaskT", "green", 10, 999, 3)])
        .await
        .unwrap();

    assert_eq!(second.created_count, 0);
    assert_eq!(second.updated_count, 1);
    let line = &second.processed_products[0];
    assert_eq!(line.action, UpsertAction::Updated);
    assert_eq!(line.mask_type_id, first.processed_products[0].mask_type_id);
    assert_eq!(line.inventory_id, first.processed_products[0].inventory_id);

    let lines = db
        .queries()
        .get_pharmacy_inventory(&north.id, Default::default(), Default::default())
        .await
        .unwrap();
    let green = lines.iter().find(|l| l.mask_type.color == "green").unwrap();
    assert_eq!(green.price_cents, 999);
    assert_eq!(green.quantity, 3);
}

#[tokio::test]
async fn test_bulk_upsert_new_stock_row_for_known_mask_counts_as_created() {
    let db = setup().await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let south = add_pharmacy(&db, "South Pharmacy", 0).await;
    let green = add_mask(&db, "MaskT", "green", 10).await;
    add_stock(&db, &north, &green, 100, 1).await;

    let summary = db
        .transactions()
        .bulk_upsert_mask_products(&south.id, vec![product("MaskT", "green", 10, 150, 7)])
        .await
        .unwrap();

    let line = &summary.processed_products[0];
    assert_eq!(line.mask_type_id, green.id);
    assert_eq!(line.action, UpsertAction::Created);
    assert_eq!(stock(&db, &south, &green).await, Some(7));
}

#[tokio::test]
async fn test_bulk_upsert_validates_before_writing() {
    let db = setup().await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let engine = db.transactions();

    let err = engine
        .bulk_upsert_mask_products(&north.id, vec![product("MaskT", "green", 10, 100, 1), product("", "red", 1, 1, 1)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let mut explicit = product("MaskT", "green", 10, 100, 1);
    explicit.mask_type_id = Some("no-such-mask".to_string());
    let err = engine.bulk_upsert_mask_products(&north.id, vec![explicit]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = engine
        .bulk_upsert_mask_products("no-such-pharmacy", vec![product("MaskT", "green", 10, 100, 1)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let lines = db
        .queries()
        .get_pharmacy_inventory(&north.id, Default::default(), Default::default())
        .await
        .unwrap();
    assert!(lines.is_empty());
}
