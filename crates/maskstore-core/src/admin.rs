//! # Administrative Operations
//!
//! Request and result shapes for direct balance/stock overwrites and the
//! bulk mask-product upsert, plus the pure checks they need.
//!
//! ## Upsert Resolution
//! ```text
//! product ──► mask_type_id given? ──yes──► load by id ── absent ──► NotFound
//!                  │ no                        │ found: overwrite all fields
//!                  ▼                           ▼
//!        find by (brand, color, pack_size) ──► found: refresh display_name
//!                  │ absent
//!                  ▼
//!             create mask type
//!                  │
//!                  ▼
//!   find inventory (pharmacy, mask) ──► found: overwrite price + quantity
//!                  │ absent
//!                  ▼
//!             create inventory row
//!
//! action = Created if either step created a row, else Updated
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{MaskType, MaskTypeKey};
use crate::validation::{validate_mask_fields, validate_price_cents, validate_stock_quantity};

// =============================================================================
// Balance / Stock Overwrites
// =============================================================================

/// Returned by an administrative balance overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BalanceUpdate {
    pub user_id: String,
    pub user_name: String,
    pub previous_balance_cents: i64,
    pub new_balance_cents: i64,
    /// `new - previous`, negative when the balance was lowered.
    pub delta_cents: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Id of the administrator who made the change.
    pub updated_by: String,
}

impl BalanceUpdate {
    pub fn delta(&self) -> Money {
        Money::from_cents(self.delta_cents)
    }
}

/// Returned by an administrative stock overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryUpdate {
    pub inventory_id: String,
    pub pharmacy_id: String,
    pub pharmacy_name: String,
    pub mask_type_id: String,
    pub mask_name: String,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    pub delta: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Bulk Upsert
// =============================================================================

/// One product line of a bulk upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MaskProductInput {
    /// When set, the mask type must already exist.
    pub mask_type_id: Option<String>,
    pub brand: String,
    pub color: String,
    pub pack_size: i64,
    pub display_name: String,
    pub price_cents: i64,
    pub quantity: i64,
}

impl MaskProductInput {
    pub fn validate(&self) -> CoreResult<()> {
        validate_mask_fields(&self.brand, &self.color, &self.display_name, self.pack_size)?;
        validate_price_cents(self.price_cents)?;
        validate_stock_quantity(self.quantity)?;
        Ok(())
    }

    pub fn key(&self) -> MaskTypeKey {
        MaskTypeKey {
            brand: self.brand.trim().to_string(),
            color: self.color.trim().to_string(),
            pack_size: self.pack_size,
        }
    }

    /// The mask type this input describes, under the given id.
    pub fn to_mask_type(&self, id: String) -> MaskType {
        MaskType {
            id,
            brand: self.brand.trim().to_string(),
            color: self.color.trim().to_string(),
            pack_size: self.pack_size,
            display_name: self.display_name.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
}

impl UpsertAction {
    /// Created if either the mask type or the inventory row is new.
    pub fn classify(mask_created: bool, inventory_created: bool) -> Self {
        if mask_created || inventory_created {
            UpsertAction::Created
        } else {
            UpsertAction::Updated
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpsertedProduct {
    pub mask_type_id: String,
    pub inventory_id: String,
    pub brand: String,
    pub color: String,
    pub pack_size: i64,
    pub display_name: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub action: UpsertAction,
}

/// Returned by a committed bulk upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BulkUpsertSummary {
    pub pharmacy_id: String,
    pub pharmacy_name: String,
    pub total_processed: usize,
    pub created_count: usize,
    pub updated_count: usize,
    pub processed_products: Vec<UpsertedProduct>,
    #[ts(as = "String")]
    pub processed_at: DateTime<Utc>,
}

impl BulkUpsertSummary {
    pub fn new(
        pharmacy_id: String,
        pharmacy_name: String,
        processed_products: Vec<UpsertedProduct>,
        processed_at: DateTime<Utc>,
    ) -> Self {
        let created_count = processed_products
            .iter()
            .filter(|p| p.action == UpsertAction::Created)
            .count();
        BulkUpsertSummary {
            pharmacy_id,
            pharmacy_name,
            total_processed: processed_products.len(),
            created_count,
            updated_count: processed_products.len() - created_count,
            processed_products,
            processed_at,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn input() -> MaskProductInput {
        MaskProductInput {
            mask_type_id: None,
            brand: " MaskT ".to_string(),
            color: "green".to_string(),
            pack_size: 10,
            display_name: "MaskT (green) (10 per pack)".to_string(),
            price_cents: 1299,
            quantity: 40,
        }
    }

    fn product(action: UpsertAction) -> UpsertedProduct {
        UpsertedProduct {
            mask_type_id: "m".to_string(),
            inventory_id: "i".to_string(),
            brand: "b".to_string(),
            color: "c".to_string(),
            pack_size: 1,
            display_name: "d".to_string(),
            price_cents: 0,
            quantity: 0,
            action,
        }
    }

    #[test]
    fn test_input_validation() {
        assert!(input().validate().is_ok());

        let mut bad = input();
        bad.price_cents = -1;
        assert!(matches!(bad.validate(), Err(CoreError::Validation(_))));

        let mut bad = input();
        bad.quantity = -5;
        assert!(bad.validate().is_err());

        let mut bad = input();
        bad.pack_size = 0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_key_is_trimmed() {
        assert_eq!(input().key().brand, "MaskT");
        assert_eq!(input().to_mask_type("m-1".to_string()).brand, "MaskT");
    }

    #[test]
    fn test_classify() {
        assert_eq!(UpsertAction::classify(true, false), UpsertAction::Created);
        assert_eq!(UpsertAction::classify(false, true), UpsertAction::Created);
        assert_eq!(UpsertAction::classify(false, false), UpsertAction::Updated);
    }

    #[test]
    fn test_summary_counts() {
        let summary = BulkUpsertSummary::new(
            "p".to_string(),
            "P".to_string(),
            vec![
                product(UpsertAction::Created),
                product(UpsertAction::Updated),
                product(UpsertAction::Created),
            ],
            Utc::now(),
        );
        assert_eq!(summary.total_processed, 3);
        assert_eq!(summary.created_count, 2);
        assert_eq!(summary.updated_count, 1);
    }
}
