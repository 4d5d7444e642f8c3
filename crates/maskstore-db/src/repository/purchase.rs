//! # Purchase Repository
//!
//! Purchase histories, their line items, and the joined records used by
//! cancellation and analytics.
//!
//! ## Record Assembly
//! ```text
//! purchase_histories ──┬── pharmacies.name ──► PurchaseRecord
//!                      └── purchase_details ── mask_types ──► PurchaseDetailLine
//! ```
//! Histories and details are fetched with two queries and stitched together
//! in memory, keyed by `purchase_history_id`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use maskstore_core::{
    MaskType, PurchaseDetail, PurchaseDetailLine, PurchaseHistory, PurchaseRecord, TransactionStatus,
};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

const HISTORY_COLUMNS: &str = "id, user_id, pharmacy_id, transaction_amount_cents, transaction_date, status";

const DETAIL_LINE_SELECT: &str = r#"
    SELECT
        d.id AS purchase_detail_id,
        d.purchase_history_id,
        d.quantity,
        d.price_cents,
        d.total_price_cents,
        m.id AS mask_type_id,
        m.brand,
        m.color,
        m.pack_size,
        m.display_name
    FROM purchase_details d
    INNER JOIN mask_types m ON m.id = d.mask_type_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct DetailLineRow {
    purchase_detail_id: String,
    purchase_history_id: String,
    quantity: i64,
    price_cents: i64,
    total_price_cents: i64,
    mask_type_id: String,
    brand: String,
    color: String,
    pack_size: i64,
    display_name: String,
}

impl DetailLineRow {
    fn into_line(self) -> (String, PurchaseDetailLine) {
        let line = PurchaseDetailLine {
            purchase_detail_id: self.purchase_detail_id,
            quantity: self.quantity,
            price_cents: self.price_cents,
            total_price_cents: self.total_price_cents,
            mask_type: MaskType {
                id: self.mask_type_id,
                brand: self.brand,
                color: self.color,
                pack_size: self.pack_size,
                display_name: self.display_name,
            },
        };
        (self.purchase_history_id, line)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RecordRow {
    id: String,
    user_id: String,
    user_name: String,
    pharmacy_id: String,
    pharmacy_name: String,
    transaction_amount_cents: i64,
    transaction_date: DateTime<Utc>,
    status: TransactionStatus,
}

// =============================================================================
// Writes
// =============================================================================

/// Inserts a purchase history.
pub async fn insert_history(conn: &mut SqliteConnection, history: &PurchaseHistory) -> DbResult<()> {
    debug!(
        id = %history.id,
        user_id = %history.user_id,
        pharmacy_id = %history.pharmacy_id,
        amount = history.transaction_amount_cents,
        "Inserting purchase history"
    );

    sqlx::query(
        r#"
        INSERT INTO purchase_histories (
            id, user_id, pharmacy_id, transaction_amount_cents, transaction_date, status
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&history.id)
    .bind(&history.user_id)
    .bind(&history.pharmacy_id)
    .bind(history.transaction_amount_cents)
    .bind(history.transaction_date)
    .bind(history.status)
    .execute(conn)
    .await?;

    Ok(())
}

/// Inserts one line item.
pub async fn insert_detail(conn: &mut SqliteConnection, detail: &PurchaseDetail) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO purchase_details (
            id, purchase_history_id, mask_type_id, quantity, price_cents, total_price_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&detail.id)
    .bind(&detail.purchase_history_id)
    .bind(&detail.mask_type_id)
    .bind(detail.quantity)
    .bind(detail.price_cents)
    .bind(detail.total_price_cents)
    .execute(conn)
    .await?;

    Ok(())
}

/// Flips a history from DONE to CANCELLED.
///
/// Returns `false` if the history was not DONE any more.
pub async fn mark_cancelled(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
    let result = sqlx::query("UPDATE purchase_histories SET status = ?2 WHERE id = ?1 AND status = ?3")
        .bind(id)
        .bind(TransactionStatus::Cancelled)
        .bind(TransactionStatus::Done)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

// =============================================================================
// Reads
// =============================================================================

/// Gets a purchase history only if it belongs to `user_id`.
pub async fn find_history_for_user(
    conn: &mut SqliteConnection,
    id: &str,
    user_id: &str,
) -> DbResult<Option<PurchaseHistory>> {
    let history = sqlx::query_as::<_, PurchaseHistory>(&format!(
        "SELECT {HISTORY_COLUMNS} FROM purchase_histories WHERE id = ?1 AND user_id = ?2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;

    Ok(history)
}

/// Line items of one history with their mask types, in insertion order.
pub async fn details_for(conn: &mut SqliteConnection, history_id: &str) -> DbResult<Vec<PurchaseDetailLine>> {
    let rows = sqlx::query_as::<_, DetailLineRow>(&format!(
        "{DETAIL_LINE_SELECT} WHERE d.purchase_history_id = ?1 ORDER BY d.rowid"
    ))
    .bind(history_id)
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(|row| row.into_line().1).collect())
}

/// Every purchase record dated within `[start, end]`, any status, paired
/// with the buyer's name.
///
/// Ordered by user, then newest first.
pub async fn records_in_range(
    conn: &mut SqliteConnection,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> DbResult<Vec<(String, PurchaseRecord)>> {
    debug!(start = %start, end = %end, "Loading purchase records");

    let rows = sqlx::query_as::<_, RecordRow>(
        r#"
        SELECT
            h.id,
            h.user_id,
            u.name AS user_name,
            h.pharmacy_id,
            p.name AS pharmacy_name,
            h.transaction_amount_cents,
            h.transaction_date,
            h.status
        FROM purchase_histories h
        INNER JOIN users u ON u.id = h.user_id
        INNER JOIN pharmacies p ON p.id = h.pharmacy_id
        WHERE h.transaction_date >= ?1 AND h.transaction_date <= ?2
        ORDER BY h.user_id, h.transaction_date DESC, h.id
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(&mut *conn)
    .await?;

    let detail_rows = sqlx::query_as::<_, DetailLineRow>(&format!(
        r#"{DETAIL_LINE_SELECT}
        INNER JOIN purchase_histories h ON h.id = d.purchase_history_id
        WHERE h.transaction_date >= ?1 AND h.transaction_date <= ?2
        ORDER BY d.rowid"#
    ))
    .bind(start)
    .bind(end)
    .fetch_all(&mut *conn)
    .await?;

    let mut details: HashMap<String, Vec<PurchaseDetailLine>> = HashMap::new();
    for row in detail_rows {
        let (history_id, line) = row.into_line();
        details.entry(history_id).or_default().push(line);
    }

    let records = rows
        .into_iter()
        .map(|row| {
            let purchase_details = details.remove(&row.id).unwrap_or_default();
            let record = PurchaseRecord {
                purchase_history_id: row.id,
                user_id: row.user_id,
                pharmacy_id: row.pharmacy_id,
                pharmacy_name: row.pharmacy_name,
                transaction_amount_cents: row.transaction_amount_cents,
                transaction_date: row.transaction_date,
                status: row.status,
                purchase_details,
            };
            (row.user_name, record)
        })
        .collect();

    Ok(records)
}
