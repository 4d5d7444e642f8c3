//! Store listings, opening-hour filters and the price/quantity filter.

mod common;

use common::*;
use maskstore_core::hours::{StoreFilter, Weekday};
use maskstore_core::inventory::{PriceQuantityFilter, SortBy, SortOrder, ThresholdType};
use maskstore_core::{ErrorKind, Money};

fn window(weekdays: &[&str], start: Option<&str>, end: Option<&str>) -> StoreFilter {
    StoreFilter {
        weekdays: weekdays.iter().map(|d| d.to_string()).collect(),
        start_time: start.map(time),
        end_time: end.map(time),
    }
}

#[tokio::test]
async fn test_list_stores_nests_sorted_inventory_and_hours() {
    let db = setup().await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    add_pharmacy(&db, "Apex Drugs", 0).await;
    let zebra = add_mask(&db, "Zebra", "white", 1).await;
    let alpha = add_mask(&db, "Alpha", "blue", 1).await;
    add_stock(&db, &north, &zebra, 100, 1).await;
    add_stock(&db, &north, &alpha, 100, 1).await;
    add_hour(&db, &north, Weekday::Friday, "08:00", "12:00", false).await;
    add_hour(&db, &north, Weekday::Monday, "08:00", "12:00", false).await;

    let stores = db.queries().list_stores(&StoreFilter::default()).await.unwrap();

    assert_eq!(stores.len(), 2);
    assert_eq!(stores[0].pharmacy.name, "Apex Drugs");
    assert!(stores[0].inventories.is_empty());

    let north_view = &stores[1];
    let names: Vec<&str> = north_view.inventories.iter().map(|l| l.mask_type.brand.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Zebra"]);
    let days: Vec<Weekday> = north_view.opening_hours.iter().map(|h| h.weekday).collect();
    assert_eq!(days, vec![Weekday::Monday, Weekday::Friday]);
}

#[tokio::test]
async fn test_weekday_filter_accepts_abbreviations() {
    let db = setup().await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let south = add_pharmacy(&db, "South Pharmacy", 0).await;
    add_hour(&db, &north, Weekday::Monday, "08:00", "12:00", false).await;
    add_hour(&db, &north, Weekday::Thursday, "14:00", "18:00", false).await;
    add_hour(&db, &south, Weekday::Saturday, "10:00", "20:00", false).await;

    let stores = db
        .queries()
        .list_stores(&window(&["thur", "Funday"], None, None))
        .await
        .unwrap();

    assert_eq!(stores.len(), 1);
    assert_eq!(stores[0].pharmacy.id, north.id);
    assert_eq!(stores[0].opening_hours.len(), 1);
    assert_eq!(stores[0].opening_hours[0].weekday, Weekday::Thursday);
    assert_eq!(stores[0].opening_hours[0].weekday_short, "Thu");
}

#[tokio::test]
async fn test_overnight_hours_match_windows_across_midnight() {
    let db = setup().await;
    let night = add_pharmacy(&db, "Night Owl", 0).await;
    let day = add_pharmacy(&db, "Day Shift", 0).await;
    add_hour(&db, &night, Weekday::Monday, "22:00", "02:00", true).await;
    add_hour(&db, &day, Weekday::Monday, "08:00", "17:00", false).await;

    let engine = db.queries();

    let stores = engine
        .list_stores(&window(&["Monday"], Some("23:00"), Some("01:00")))
        .await
        .unwrap();
    assert_eq!(stores.len(), 1);
    assert_eq!(stores[0].pharmacy.id, night.id);

    let stores = engine
        .list_stores(&window(&["Monday"], Some("03:00"), Some("05:00")))
        .await
        .unwrap();
    assert!(stores.is_empty());

    let stores = engine.list_stores(&window(&[], Some("09:00"), Some("10:00"))).await.unwrap();
    assert_eq!(stores.len(), 1);
    assert_eq!(stores[0].pharmacy.id, day.id);
}

#[tokio::test]
async fn test_half_open_window_is_rejected() {
    let db = setup().await;
    let err = db
        .queries()
        .list_stores(&window(&[], Some("09:00"), None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn test_get_store_and_missing_store() {
    let db = setup().await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let green = add_mask(&db, "MaskT", "green", 10).await;
    add_stock(&db, &north, &green, 100, 3).await;
    add_hour(&db, &north, Weekday::Sunday, "09:00", "13:00", false).await;

    let engine = db.queries();
    let view = engine.get_store(&north.id).await.unwrap();
    assert_eq!(view.pharmacy.name, "North Pharmacy");
    assert_eq!(view.inventories.len(), 1);
    assert_eq!(view.opening_hours[0].weekday, Weekday::Sunday);

    let err = engine.get_store("nowhere").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_pharmacy_inventory_sorting() {
    let db = setup().await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let a = add_mask(&db, "Alpha", "blue", 1).await;
    let b = add_mask(&db, "Bravo", "blue", 1).await;
    let c = add_mask(&db, "Charlie", "blue", 1).await;
    add_stock(&db, &north, &a, 500, 1).await;
    add_stock(&db, &north, &b, 100, 1).await;
    add_stock(&db, &north, &c, 500, 1).await;

    let engine = db.queries();

    let by_price = engine
        .get_pharmacy_inventory(&north.id, SortBy::Price, SortOrder::Desc)
        .await
        .unwrap();
    let brands: Vec<&str> = by_price.iter().map(|l| l.mask_type.brand.as_str()).collect();
    assert_eq!(brands, vec!["Alpha", "Charlie", "Bravo"]);

    let by_name = engine
        .get_pharmacy_inventory(&north.id, SortBy::Name, SortOrder::Desc)
        .await
        .unwrap();
    let brands: Vec<&str> = by_name.iter().map(|l| l.mask_type.brand.as_str()).collect();
    assert_eq!(brands, vec!["Charlie", "Bravo", "Alpha"]);

    let err = engine
        .get_pharmacy_inventory("nowhere", SortBy::Name, SortOrder::Asc)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_between_filter_keeps_only_matching_lines() {
    let db = setup().await;
    let north = add_pharmacy(&db, "North Pharmacy", 0).await;
    let south = add_pharmacy(&db, "South Pharmacy", 0).await;
    let green = add_mask(&db, "MaskT", "green", 10).await;
    let black = add_mask(&db, "Cotton Kiss", "black", 3).await;
    add_stock(&db, &north, &green, 1_000, 100).await;
    add_stock(&db, &north, &black, 1_000, 200).await;
    add_stock(&db, &south, &green, 1_000, 200).await;

    let filter = PriceQuantityFilter {
        min_price: Some(Money::from_cents(500)),
        max_price: Some(Money::from_cents(2_000)),
        threshold_type: ThresholdType::Between,
        quantity_threshold: 50,
        quantity_threshold_max: Some(150),
    };

    let stores = db.queries().filter_by_price_and_quantity(&filter).await.unwrap();

    assert_eq!(stores.len(), 1);
    assert_eq!(stores[0].pharmacy.id, north.id);
    assert_eq!(stores[0].matching_count, 1);
    assert_eq!(stores[0].inventories[0].quantity, 100);
}

#[tokio::test]
async fn test_filter_rejects_inverted_bounds() {
    let db = setup().await;
    let engine = db.queries();

    let inverted_price = PriceQuantityFilter {
        min_price: Some(Money::from_cents(900)),
        max_price: Some(Money::from_cents(100)),
        threshold_type: ThresholdType::Above,
        quantity_threshold: 0,
        quantity_threshold_max: None,
    };
    let err = engine.filter_by_price_and_quantity(&inverted_price).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let open_between = PriceQuantityFilter {
        min_price: None,
        max_price: None,
        threshold_type: ThresholdType::Between,
        quantity_threshold: 10,
        quantity_threshold_max: None,
    };
    let err = engine.filter_by_price_and_quantity(&open_between).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}
