//! # Query Engine
//!
//! Read-only store listings: all stores with an opening-hours filter, one
//! store, one store's sorted inventory, and the price/quantity filter.
//!
//! ## Store Assembly
//! ```text
//! pharmacies ─────────────┐
//! inventory lines ── group by pharmacy_id ──► StoreView ──► HourPredicate::apply
//! pharmacy_hours ── group by pharmacy_id ──┘
//! ```
//! Three queries per listing regardless of store count.

use std::collections::HashMap;

use maskstore_core::hours::{HourPredicate, StoreFilter};
use maskstore_core::inventory::{filter_stores, sort_inventory, FilteredStore, PriceQuantityFilter, SortBy, SortOrder};
use maskstore_core::{InventoryLine, OpeningHour, Pharmacy, PharmacyHour, StoreView};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use crate::error::{DbError, DbResult};
use crate::repository::{hours, inventory, pharmacy};

/// Read-only store queries.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    pool: SqlitePool,
}

impl QueryEngine {
    pub fn new(pool: SqlitePool) -> Self {
        QueryEngine { pool }
    }

    /// Lists every pharmacy with its inventory and opening hours.
    ///
    /// With an active filter, only hours matching it are kept and stores
    /// left with none are dropped.
    ///
    /// ## Errors
    /// `InvalidArgument` if only one of `start_time` / `end_time` is given.
    #[instrument(skip(self))]
    pub async fn list_stores(&self, filter: &StoreFilter) -> DbResult<Vec<StoreView>> {
        let predicate = HourPredicate::compile(filter)?;

        let mut conn = self.pool.acquire().await?;
        let pharmacies = pharmacy::list_all(&mut conn).await?;
        let lines = inventory::all_lines(&mut conn).await?;
        let all_hours = hours::all(&mut conn).await?;

        let mut lines_by_pharmacy = group_lines(lines);
        let mut hours_by_pharmacy = group_hours(all_hours);

        let stores: Vec<StoreView> = pharmacies
            .into_iter()
            .map(|pharmacy| StoreView {
                inventories: lines_by_pharmacy.remove(&pharmacy.id).unwrap_or_default(),
                opening_hours: hours_by_pharmacy.remove(&pharmacy.id).unwrap_or_default(),
                pharmacy,
            })
            .collect();

        let stores = predicate.apply(stores);
        debug!(count = stores.len(), filtered = predicate.is_active(), "Listed stores");
        Ok(stores)
    }

    /// One pharmacy with its inventory and opening hours.
    #[instrument(skip(self))]
    pub async fn get_store(&self, pharmacy_id: &str) -> DbResult<StoreView> {
        let mut conn = self.pool.acquire().await?;

        let pharmacy = pharmacy::find(&mut conn, pharmacy_id)
            .await?
            .ok_or_else(|| DbError::not_found("Pharmacy", pharmacy_id))?;
        let inventories = inventory::lines_for_pharmacy(&mut conn, &pharmacy.id).await?;
        let opening_hours = hours::for_pharmacy(&mut conn, &pharmacy.id)
            .await?
            .iter()
            .filter_map(OpeningHour::from_hour)
            .collect();

        Ok(StoreView {
            pharmacy,
            inventories,
            opening_hours,
        })
    }

    /// One pharmacy's inventory, sorted by name or by price.
    #[instrument(skip(self))]
    pub async fn get_pharmacy_inventory(
        &self,
        pharmacy_id: &str,
        sort_by: SortBy,
        sort_order: SortOrder,
    ) -> DbResult<Vec<InventoryLine>> {
        let mut conn = self.pool.acquire().await?;

        if pharmacy::find(&mut conn, pharmacy_id).await?.is_none() {
            return Err(DbError::not_found("Pharmacy", pharmacy_id));
        }

        let mut lines = inventory::lines_for_pharmacy(&mut conn, pharmacy_id).await?;
        sort_inventory(&mut lines, sort_by, sort_order);
        Ok(lines)
    }

    /// Pharmacies with at least one line inside the price bounds and the
    /// quantity predicate, each with only its matching lines.
    ///
    /// ## Errors
    /// `InvalidArgument` for inverted price bounds or a malformed BETWEEN.
    #[instrument(skip(self))]
    pub async fn filter_by_price_and_quantity(&self, filter: &PriceQuantityFilter) -> DbResult<Vec<FilteredStore>> {
        filter.validate()?;

        let mut conn = self.pool.acquire().await?;
        let pharmacies = pharmacy::list_all(&mut conn).await?;
        let mut lines_by_pharmacy = group_lines(inventory::all_lines(&mut conn).await?);

        let groups: Vec<(Pharmacy, Vec<InventoryLine>)> = pharmacies
            .into_iter()
            .map(|pharmacy| {
                let lines = lines_by_pharmacy.remove(&pharmacy.id).unwrap_or_default();
                (pharmacy, lines)
            })
            .collect();

        Ok(filter_stores(filter, groups))
    }
}

/// Buckets lines by pharmacy, keeping their order within each bucket.
fn group_lines(lines: Vec<InventoryLine>) -> HashMap<String, Vec<InventoryLine>> {
    let mut grouped: HashMap<String, Vec<InventoryLine>> = HashMap::new();
    for line in lines {
        grouped.entry(line.pharmacy_id.clone()).or_default().push(line);
    }
    grouped
}

fn group_hours(all_hours: Vec<PharmacyHour>) -> HashMap<String, Vec<OpeningHour>> {
    let mut grouped: HashMap<String, Vec<OpeningHour>> = HashMap::new();
    for hour in &all_hours {
        if let Some(opening) = OpeningHour::from_hour(hour) {
            grouped.entry(hour.pharmacy_id.clone()).or_default().push(opening);
        }
    }
    grouped
}
