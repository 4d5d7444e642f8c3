//! Shared fixtures for the engine integration tests.
//!
//! Every test gets its own database with migrations applied, in memory
//! unless it needs concurrent writers, and seeds it through the
//! repositories directly.

#![allow(dead_code)]

use chrono::{DateTime, NaiveTime, Utc};
use maskstore_core::hours::Weekday;
use maskstore_core::{Inventory, MaskType, Pharmacy, PharmacyHour, PurchaseHistory, TransactionStatus, User};
use maskstore_db::repository::{self, hours, inventory, mask_type, pharmacy, purchase, user};
use maskstore_db::{Database, DbConfig};
use std::time::Duration;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

pub async fn setup() -> Database {
    init_test_tracing();
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

/// A file-backed database under `dir`, with a real connection pool, for
/// tests that need concurrent writers.
pub async fn setup_file(dir: &TempDir, max_connections: u32) -> Database {
    init_test_tracing();
    let config = DbConfig::new(dir.path().join("maskstore.db"))
        .max_connections(max_connections)
        .busy_timeout(Duration::from_secs(1));
    Database::new(config).await.expect("file database")
}

pub fn time(text: &str) -> NaiveTime {
    NaiveTime::parse_from_str(text, "%H:%M").expect("HH:MM")
}

pub fn at(text: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(text)
        .expect("RFC 3339 timestamp")
        .with_timezone(&Utc)
}

// =============================================================================
// Seeding
// =============================================================================

pub async fn add_pharmacy(db: &Database, name: &str, balance_cents: i64) -> Pharmacy {
    let row = Pharmacy {
        id: repository::new_id(),
        name: name.to_string(),
        cash_balance_cents: balance_cents,
        opening_hours: None,
    };
    let mut conn = db.pool().acquire().await.unwrap();
    pharmacy::insert(&mut conn, &row).await.unwrap();
    row
}

pub async fn add_user(db: &Database, name: &str, balance_cents: i64) -> User {
    let row = User {
        id: repository::new_id(),
        name: name.to_string(),
        cash_balance_cents: balance_cents,
    };
    let mut conn = db.pool().acquire().await.unwrap();
    user::insert(&mut conn, &row).await.unwrap();
    row
}

pub async fn add_mask(db: &Database, brand: &str, color: &str, pack_size: i64) -> MaskType {
    let row = MaskType {
        id: repository::new_id(),
        brand: brand.to_string(),
        color: color.to_string(),
        pack_size,
        display_name: format!("{brand} ({color}) ({pack_size} per pack)"),
    };
    let mut conn = db.pool().acquire().await.unwrap();
    mask_type::insert(&mut conn, &row).await.unwrap();
    row
}

pub async fn add_stock(db: &Database, store: &Pharmacy, mask: &MaskType, price_cents: i64, quantity: i64) -> Inventory {
    let row = Inventory {
        id: repository::new_id(),
        pharmacy_id: store.id.clone(),
        mask_type_id: mask.id.clone(),
        price_cents,
        quantity,
    };
    let mut conn = db.pool().acquire().await.unwrap();
    inventory::insert(&mut conn, &row).await.unwrap();
    row
}

pub async fn add_hour(db: &Database, store: &Pharmacy, weekday: Weekday, open: &str, close: &str, is_overnight: bool) {
    let row = PharmacyHour {
        id: repository::new_id(),
        pharmacy_id: store.id.clone(),
        weekday_id: weekday.ordinal(),
        open_time: time(open),
        close_time: time(close),
        is_overnight,
    };
    let mut conn = db.pool().acquire().await.unwrap();
    hours::insert(&mut conn, &row).await.unwrap();
}

/// Inserts a bare DONE history, bypassing the purchase flow.
pub async fn add_history(db: &Database, buyer: &User, store: &Pharmacy, amount_cents: i64, date: &str) -> PurchaseHistory {
    let row = PurchaseHistory {
        id: repository::new_id(),
        user_id: buyer.id.clone(),
        pharmacy_id: store.id.clone(),
        transaction_amount_cents: amount_cents,
        transaction_date: at(date),
        status: TransactionStatus::Done,
    };
    let mut conn = db.pool().acquire().await.unwrap();
    purchase::insert_history(&mut conn, &row).await.unwrap();
    row
}

// =============================================================================
// Inspection
// =============================================================================

pub async fn user_balance(db: &Database, id: &str) -> i64 {
    let mut conn = db.pool().acquire().await.unwrap();
    user::find(&mut conn, id).await.unwrap().unwrap().cash_balance_cents
}

pub async fn pharmacy_balance(db: &Database, id: &str) -> i64 {
    let mut conn = db.pool().acquire().await.unwrap();
    pharmacy::find(&mut conn, id).await.unwrap().unwrap().cash_balance_cents
}

/// On-hand quantity of a (pharmacy, mask) pair, if a row exists.
pub async fn stock(db: &Database, store: &Pharmacy, mask: &MaskType) -> Option<i64> {
    let mut conn = db.pool().acquire().await.unwrap();
    inventory::find_for(&mut conn, &store.id, &mask.id)
        .await
        .unwrap()
        .map(|row| row.quantity)
}

pub async fn history_count(db: &Database) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM purchase_histories")
        .fetch_one(db.pool())
        .await
        .unwrap()
}
