//! # Opening Hours Repository

use maskstore_core::PharmacyHour;
use sqlx::SqliteConnection;

use crate::error::DbResult;

const COLUMNS: &str = "id, pharmacy_id, weekday_id, open_time, close_time, is_overnight";

/// One pharmacy's hours, in weekday order.
pub async fn for_pharmacy(conn: &mut SqliteConnection, pharmacy_id: &str) -> DbResult<Vec<PharmacyHour>> {
    let hours = sqlx::query_as::<_, PharmacyHour>(&format!(
        "SELECT {COLUMNS} FROM pharmacy_hours WHERE pharmacy_id = ?1 ORDER BY weekday_id, open_time"
    ))
    .bind(pharmacy_id)
    .fetch_all(conn)
    .await?;

    Ok(hours)
}

/// Every pharmacy's hours, grouped by pharmacy and in weekday order.
pub async fn all(conn: &mut SqliteConnection) -> DbResult<Vec<PharmacyHour>> {
    let hours = sqlx::query_as::<_, PharmacyHour>(&format!(
        "SELECT {COLUMNS} FROM pharmacy_hours ORDER BY pharmacy_id, weekday_id, open_time"
    ))
    .fetch_all(conn)
    .await?;

    Ok(hours)
}

/// Inserts an opening hour. `is_overnight` is stored as given.
pub async fn insert(conn: &mut SqliteConnection, hour: &PharmacyHour) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO pharmacy_hours (id, pharmacy_id, weekday_id, open_time, close_time, is_overnight)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&hour.id)
    .bind(&hour.pharmacy_id)
    .bind(hour.weekday_id)
    .bind(hour.open_time)
    .bind(hour.close_time)
    .bind(hour.is_overnight)
    .execute(conn)
    .await?;

    Ok(())
}
