//! # User Repository
//!
//! Lookups and balance movements for users.

use maskstore_core::{Money, User};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

/// Gets a user by ID.
pub async fn find(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT id, name, cash_balance_cents FROM users WHERE id = ?1")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(user)
}

/// Inserts a user.
pub async fn insert(conn: &mut SqliteConnection, user: &User) -> DbResult<()> {
    debug!(id = %user.id, "Inserting user");

    sqlx::query("INSERT INTO users (id, name, cash_balance_cents) VALUES (?1, ?2, ?3)")
        .bind(&user.id)
        .bind(&user.name)
        .bind(user.cash_balance_cents)
        .execute(conn)
        .await?;

    Ok(())
}

/// Subtracts `amount` unless that would take the balance below zero.
///
/// ## Why a guarded UPDATE
/// ```text
/// Purchase A reads balance 100 ──┐
/// Purchase B reads balance 100 ──┤  both plan a debit of 80
///                                ▼
/// A: UPDATE ... WHERE balance >= 80  → 1 row  (balance 20)
/// B: UPDATE ... WHERE balance >= 80  → 0 rows → InsufficientFunds, rollback
/// ```
pub async fn debit(conn: &mut SqliteConnection, id: &str, amount: Money) -> DbResult<bool> {
    debug!(id = %id, amount = %amount, "Debiting user");

    let result = sqlx::query(
        r#"
        UPDATE users SET cash_balance_cents = cash_balance_cents - ?2
        WHERE id = ?1 AND cash_balance_cents >= ?2
        "#,
    )
    .bind(id)
    .bind(amount.cents())
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Adds `amount` to the user's balance.
pub async fn credit(conn: &mut SqliteConnection, id: &str, amount: Money) -> DbResult<bool> {
    debug!(id = %id, amount = %amount, "Crediting user");

    let result = sqlx::query("UPDATE users SET cash_balance_cents = cash_balance_cents + ?2 WHERE id = ?1")
        .bind(id)
        .bind(amount.cents())
        .execute(conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Overwrites the user's balance.
pub async fn set_balance(conn: &mut SqliteConnection, id: &str, balance: Money) -> DbResult<bool> {
    let result = sqlx::query("UPDATE users SET cash_balance_cents = ?2 WHERE id = ?1")
        .bind(id)
        .bind(balance.cents())
        .execute(conn)
        .await?;

    Ok(result.rows_affected() == 1)
}
