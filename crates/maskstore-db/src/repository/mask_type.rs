//! # Mask Type Repository
//!
//! Mask types and the `(brand, color, pack_size)` natural-key lookup used by
//! the bulk upsert's find-or-create.

use maskstore_core::{MaskType, MaskTypeKey};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

const COLUMNS: &str = "id, brand, color, pack_size, display_name";

/// Gets a mask type by ID.
pub async fn find(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<MaskType>> {
    let mask = sqlx::query_as::<_, MaskType>(&format!("SELECT {COLUMNS} FROM mask_types WHERE id = ?1"))
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(mask)
}

/// Finds a mask type by its natural key.
///
/// The key is not unique in the schema; the oldest matching row wins.
pub async fn find_by_key(conn: &mut SqliteConnection, key: &MaskTypeKey) -> DbResult<Option<MaskType>> {
    let mask = sqlx::query_as::<_, MaskType>(&format!(
        r#"
        SELECT {COLUMNS} FROM mask_types
        WHERE brand = ?1 AND color = ?2 AND pack_size = ?3
        ORDER BY rowid
        LIMIT 1
        "#
    ))
    .bind(&key.brand)
    .bind(&key.color)
    .bind(key.pack_size)
    .fetch_optional(conn)
    .await?;

    Ok(mask)
}

/// Inserts a mask type.
pub async fn insert(conn: &mut SqliteConnection, mask: &MaskType) -> DbResult<()> {
    debug!(id = %mask.id, brand = %mask.brand, "Inserting mask type");

    sqlx::query(
        r#"
        INSERT INTO mask_types (id, brand, color, pack_size, display_name)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&mask.id)
    .bind(&mask.brand)
    .bind(&mask.color)
    .bind(mask.pack_size)
    .bind(&mask.display_name)
    .execute(conn)
    .await?;

    Ok(())
}

/// Overwrites every descriptive field of a mask type.
pub async fn update(conn: &mut SqliteConnection, mask: &MaskType) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE mask_types SET brand = ?2, color = ?3, pack_size = ?4, display_name = ?5
        WHERE id = ?1
        "#,
    )
    .bind(&mask.id)
    .bind(&mask.brand)
    .bind(&mask.color)
    .bind(mask.pack_size)
    .bind(&mask.display_name)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Refreshes the display name of a mask type found by natural key.
pub async fn update_display_name(conn: &mut SqliteConnection, id: &str, display_name: &str) -> DbResult<bool> {
    let result = sqlx::query("UPDATE mask_types SET display_name = ?2 WHERE id = ?1")
        .bind(id)
        .bind(display_name)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() == 1)
}
