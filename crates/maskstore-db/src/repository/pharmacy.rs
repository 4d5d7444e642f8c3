//! # Pharmacy Repository
//!
//! Lookups and balance movements for pharmacies.

use maskstore_core::{Money, Pharmacy};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

const COLUMNS: &str = "id, name, cash_balance_cents, opening_hours";

/// Gets a pharmacy by ID.
pub async fn find(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Pharmacy>> {
    let pharmacy = sqlx::query_as::<_, Pharmacy>(&format!("SELECT {COLUMNS} FROM pharmacies WHERE id = ?1"))
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(pharmacy)
}

/// All pharmacies, ordered by name.
pub async fn list_all(conn: &mut SqliteConnection) -> DbResult<Vec<Pharmacy>> {
    let pharmacies = sqlx::query_as::<_, Pharmacy>(&format!("SELECT {COLUMNS} FROM pharmacies ORDER BY name, id"))
        .fetch_all(conn)
        .await?;

    Ok(pharmacies)
}

/// Inserts a pharmacy.
pub async fn insert(conn: &mut SqliteConnection, pharmacy: &Pharmacy) -> DbResult<()> {
    debug!(id = %pharmacy.id, name = %pharmacy.name, "Inserting pharmacy");

    sqlx::query(
        r#"
        INSERT INTO pharmacies (id, name, cash_balance_cents, opening_hours)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&pharmacy.id)
    .bind(&pharmacy.name)
    .bind(pharmacy.cash_balance_cents)
    .bind(&pharmacy.opening_hours)
    .execute(conn)
    .await?;

    Ok(())
}

/// Adds `amount` to the pharmacy's balance.
pub async fn credit(conn: &mut SqliteConnection, id: &str, amount: Money) -> DbResult<bool> {
    debug!(id = %id, amount = %amount, "Crediting pharmacy");

    let result = sqlx::query("UPDATE pharmacies SET cash_balance_cents = cash_balance_cents + ?2 WHERE id = ?1")
        .bind(id)
        .bind(amount.cents())
        .execute(conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Subtracts `amount` unless that would take the balance below zero.
///
/// Returns `false` when the guard rejected the debit.
pub async fn debit(conn: &mut SqliteConnection, id: &str, amount: Money) -> DbResult<bool> {
    debug!(id = %id, amount = %amount, "Debiting pharmacy");

    let result = sqlx::query(
        r#"
        UPDATE pharmacies SET cash_balance_cents = cash_balance_cents - ?2
        WHERE id = ?1 AND cash_balance_cents >= ?2
        "#,
    )
    .bind(id)
    .bind(amount.cents())
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}
