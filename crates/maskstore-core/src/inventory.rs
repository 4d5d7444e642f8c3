//! # Inventory Views
//!
//! Sorting of a pharmacy's inventory and the price/quantity filter.
//!
//! ## Price / Quantity Filter
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  line kept  ⇔  min_price ≤ price ≤ max_price   (each bound optional)   │
//! │             ∧  quantity predicate                                      │
//! │                                                                         │
//! │     ABOVE    quantity >  threshold                                     │
//! │     BELOW    quantity <  threshold                                     │
//! │     BETWEEN  threshold ≤ quantity ≤ threshold_max                      │
//! │                                                                         │
//! │  A pharmacy is reported only if at least one of its lines is kept.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{InventoryLine, Pharmacy};

// =============================================================================
// Sorting
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortBy {
    #[default]
    Name,
    Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Sorts inventory lines in place.
///
/// `Price` breaks ties on display name (always ascending) so equal prices
/// come back in a stable, predictable order.
pub fn sort_inventory(lines: &mut [InventoryLine], sort_by: SortBy, order: SortOrder) {
    let directed = |ordering: Ordering| match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    };

    match sort_by {
        SortBy::Name => {
            lines.sort_by(|a, b| directed(a.mask_type.display_name.cmp(&b.mask_type.display_name)))
        }
        SortBy::Price => lines.sort_by(|a, b| {
            directed(a.price_cents.cmp(&b.price_cents))
                .then_with(|| a.mask_type.display_name.cmp(&b.mask_type.display_name))
        }),
    }
}

// =============================================================================
// Price / Quantity Filter
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThresholdType {
    Above,
    Below,
    Between,
}

/// Caller-supplied filter over every pharmacy's inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceQuantityFilter {
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub threshold_type: ThresholdType,
    pub quantity_threshold: i64,
    pub quantity_threshold_max: Option<i64>,
}

impl PriceQuantityFilter {
    /// Checks the filter for internal consistency.
    ///
    /// ## Errors
    /// `InvalidArgument` when `min_price > max_price`, when BETWEEN has no
    /// upper bound, or when `quantity_threshold >= quantity_threshold_max`.
    pub fn validate(&self) -> CoreResult<()> {
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(CoreError::invalid_argument(format!(
                    "min_price ({min}) cannot be greater than max_price ({max})"
                )));
            }
        }

        if self.threshold_type == ThresholdType::Between {
            let max = self.quantity_threshold_max.ok_or_else(|| {
                CoreError::invalid_argument("quantity_threshold_max is required for BETWEEN")
            })?;
            if self.quantity_threshold >= max {
                return Err(CoreError::invalid_argument(format!(
                    "quantity_threshold ({}) must be less than quantity_threshold_max ({max})",
                    self.quantity_threshold
                )));
            }
        }

        Ok(())
    }

    pub fn matches_price(&self, price: Money) -> bool {
        self.min_price.map_or(true, |min| price >= min) && self.max_price.map_or(true, |max| price <= max)
    }

    pub fn matches_quantity(&self, quantity: i64) -> bool {
        match self.threshold_type {
            ThresholdType::Above => quantity > self.quantity_threshold,
            ThresholdType::Below => quantity < self.quantity_threshold,
            ThresholdType::Between => match self.quantity_threshold_max {
                Some(max) => quantity >= self.quantity_threshold && quantity <= max,
                None => false,
            },
        }
    }

    pub fn matches(&self, line: &InventoryLine) -> bool {
        self.matches_price(line.price()) && self.matches_quantity(line.quantity)
    }
}

/// One pharmacy with the subset of its inventory that passed the filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FilteredStore {
    pub pharmacy: Pharmacy,
    pub matching_count: usize,
    pub inventories: Vec<InventoryLine>,
}

/// Applies a validated filter to `(pharmacy, lines)` groups.
///
/// Input order is preserved; groups with no surviving line are dropped.
pub fn filter_stores(
    filter: &PriceQuantityFilter,
    groups: Vec<(Pharmacy, Vec<InventoryLine>)>,
) -> Vec<FilteredStore> {
    groups
        .into_iter()
        .filter_map(|(pharmacy, lines)| {
            let kept: Vec<InventoryLine> = lines.into_iter().filter(|line| filter.matches(line)).collect();
            if kept.is_empty() {
                None
            } else {
                Some(FilteredStore {
                    pharmacy,
                    matching_count: kept.len(),
                    inventories: kept,
                })
            }
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
