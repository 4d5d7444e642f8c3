//! # Inventory Repository
//!
//! Stock rows, stock movements, and inventory lines joined with their mask
//! type.
//!
//! ## Stock Movements
//! ```text
//! take_stock   quantity -= n   only WHERE quantity >= n   (purchase)
//! restock      quantity += n                               (cancellation)
//! set_quantity quantity  = n                               (administration)
//! ```

use maskstore_core::{Inventory, InventoryLine, MaskType, Money};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

const COLUMNS: &str = "id, pharmacy_id, mask_type_id, price_cents, quantity";

const LINE_SELECT: &str = r#"
    SELECT
        i.id AS inventory_id,
        i.pharmacy_id,
        i.price_cents,
        i.quantity,
        m.id AS mask_type_id,
        m.brand,
        m.color,
        m.pack_size,
        m.display_name,
        p.name AS pharmacy_name
    FROM inventory i
    INNER JOIN mask_types m ON m.id = i.mask_type_id
    INNER JOIN pharmacies p ON p.id = i.pharmacy_id
"#;

/// Flat row of [`LINE_SELECT`].
#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    inventory_id: String,
    pharmacy_id: String,
    price_cents: i64,
    quantity: i64,
    mask_type_id: String,
    brand: String,
    color: String,
    pack_size: i64,
    display_name: String,
    pharmacy_name: String,
}

impl LineRow {
    fn into_line(self) -> (InventoryLine, String) {
        let line = InventoryLine {
            inventory_id: self.inventory_id,
            pharmacy_id: self.pharmacy_id,
            price_cents: self.price_cents,
            quantity: self.quantity,
            mask_type: MaskType {
                id: self.mask_type_id,
                brand: self.brand,
                color: self.color,
                pack_size: self.pack_size,
                display_name: self.display_name,
            },
        };
        (line, self.pharmacy_name)
    }
}

// =============================================================================
// Rows
// =============================================================================

/// Gets a stock row by ID.
pub async fn find(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Inventory>> {
    let inventory = sqlx::query_as::<_, Inventory>(&format!("SELECT {COLUMNS} FROM inventory WHERE id = ?1"))
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(inventory)
}

/// Gets the stock row for a (pharmacy, mask type) pair.
pub async fn find_for(
    conn: &mut SqliteConnection,
    pharmacy_id: &str,
    mask_type_id: &str,
) -> DbResult<Option<Inventory>> {
    let inventory = sqlx::query_as::<_, Inventory>(&format!(
        "SELECT {COLUMNS} FROM inventory WHERE pharmacy_id = ?1 AND mask_type_id = ?2"
    ))
    .bind(pharmacy_id)
    .bind(mask_type_id)
    .fetch_optional(conn)
    .await?;

    Ok(inventory)
}

/// Inserts a stock row.
pub async fn insert(conn: &mut SqliteConnection, inventory: &Inventory) -> DbResult<()> {
    debug!(
        pharmacy_id = %inventory.pharmacy_id,
        mask_type_id = %inventory.mask_type_id,
        quantity = inventory.quantity,
        "Inserting inventory"
    );

    sqlx::query(
        r#"
        INSERT INTO inventory (id, pharmacy_id, mask_type_id, price_cents, quantity)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&inventory.id)
    .bind(&inventory.pharmacy_id)
    .bind(&inventory.mask_type_id)
    .bind(inventory.price_cents)
    .bind(inventory.quantity)
    .execute(conn)
    .await?;

    Ok(())
}

/// Removes `quantity` units unless fewer are on hand.
///
/// Returns `false` when the guard rejected the decrement.
pub async fn take_stock(conn: &mut SqliteConnection, id: &str, quantity: i64) -> DbResult<bool> {
    debug!(id = %id, quantity, "Taking stock");

    let result = sqlx::query(
        r#"
        UPDATE inventory SET quantity = quantity - ?2
        WHERE id = ?1 AND quantity >= ?2
        "#,
    )
    .bind(id)
    .bind(quantity)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Returns `quantity` units to a stock row.
pub async fn restock(conn: &mut SqliteConnection, id: &str, quantity: i64) -> DbResult<bool> {
    debug!(id = %id, quantity, "Restocking");

    let result = sqlx::query("UPDATE inventory SET quantity = quantity + ?2 WHERE id = ?1")
        .bind(id)
        .bind(quantity)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Overwrites the on-hand quantity.
pub async fn set_quantity(conn: &mut SqliteConnection, id: &str, quantity: i64) -> DbResult<bool> {
    let result = sqlx::query("UPDATE inventory SET quantity = ?2 WHERE id = ?1")
        .bind(id)
        .bind(quantity)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Overwrites price and quantity together.
pub async fn set_price_and_quantity(
    conn: &mut SqliteConnection,
    id: &str,
    price: Money,
    quantity: i64,
) -> DbResult<bool> {
    let result = sqlx::query("UPDATE inventory SET price_cents = ?2, quantity = ?3 WHERE id = ?1")
        .bind(id)
        .bind(price.cents())
        .bind(quantity)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

// =============================================================================
// Joined Lines
// =============================================================================

/// One pharmacy's inventory, ordered by mask display name.
pub async fn lines_for_pharmacy(conn: &mut SqliteConnection, pharmacy_id: &str) -> DbResult<Vec<InventoryLine>> {
    let rows = sqlx::query_as::<_, LineRow>(&format!(
        "{LINE_SELECT} WHERE i.pharmacy_id = ?1 ORDER BY m.display_name, i.id"
    ))
    .bind(pharmacy_id)
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(|row| row.into_line().0).collect())
}

/// Every inventory line, ordered by pharmacy name then mask display name.
pub async fn all_lines(conn: &mut SqliteConnection) -> DbResult<Vec<InventoryLine>> {
    let rows = sqlx::query_as::<_, LineRow>(&format!(
        "{LINE_SELECT} ORDER BY p.name, i.pharmacy_id, m.display_name, i.id"
    ))
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(|row| row.into_line().0).collect())
}

/// Every line with stock on hand, each with its pharmacy's name.
///
/// Term matching is left to the caller: SQLite's `LOWER` only folds ASCII.
pub async fn in_stock_lines(conn: &mut SqliteConnection) -> DbResult<Vec<(InventoryLine, String)>> {
    let rows = sqlx::query_as::<_, LineRow>(&format!(
        "{LINE_SELECT} WHERE i.quantity > 0 ORDER BY m.display_name, p.name, i.id"
    ))
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(LineRow::into_line).collect())
}
