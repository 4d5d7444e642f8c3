//! # Purchase Planning
//!
//! Decides whether a multi-item purchase may proceed and, if so, exactly
//! what it will write. The database layer loads the rows, this module
//! judges them, and the unit of work applies the resulting plan.
//!
//! ## Purchase Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  items[] ──► ItemSnapshot[] (rows loaded inside the unit of work)      │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │  plan_purchase ← THIS MODULE                                           │
//! │   1. quantity > 0                                                      │
//! │   2. pharmacy exists, mask type exists        → NotFound               │
//! │   3. inventory row exists                     → NoStockRecord          │
//! │   4. cumulative qty per row ≤ stock           → InsufficientStock      │
//! │   5. grand total ≤ user balance               → InsufficientFunds      │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │  PurchasePlan { lines, groups (one per pharmacy), grand_total }        │
//! │                                                                         │
//! │  No write happens until every check above has passed.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Inventory, MaskType, Pharmacy, PurchaseHistory, TransactionStatus, User};
use crate::validation::validate_purchase_quantity;

// =============================================================================
// Request
// =============================================================================

/// One requested line of a bulk purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseItem {
    pub pharmacy_id: String,
    pub mask_type_id: String,
    pub quantity: i64,
}

/// A requested line together with the rows it refers to, as loaded.
#[derive(Debug, Clone)]
pub struct ItemSnapshot {
    pub item: PurchaseItem,
    pub pharmacy: Option<Pharmacy>,
    pub mask_type: Option<MaskType>,
    pub inventory: Option<Inventory>,
}

// =============================================================================
// Plan
// =============================================================================

/// A fully validated line, priced at the inventory's current price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLine {
    pub pharmacy_id: String,
    pub pharmacy_name: String,
    pub mask_type: MaskType,
    pub inventory_id: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// The lines bought from one pharmacy. Becomes one purchase history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PharmacyGroup {
    pub pharmacy_id: String,
    pub pharmacy_name: String,
    pub subtotal: Money,
    /// Indices into [`PurchasePlan::lines`], in request order.
    pub line_indices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchasePlan {
    pub user_id: String,
    pub previous_balance: Money,
    pub grand_total: Money,
    pub lines: Vec<PlannedLine>,
    /// In order of each pharmacy's first appearance in the request.
    pub groups: Vec<PharmacyGroup>,
}

impl PurchasePlan {
    pub fn new_balance(&self) -> Money {
        self.previous_balance - self.grand_total
    }

    /// Total quantity requested per inventory row.
    pub fn demand_by_inventory(&self) -> Vec<(String, i64)> {
        let mut order: Vec<String> = Vec::new();
        let mut demand: HashMap<String, i64> = HashMap::new();
        for line in &self.lines {
            let entry = demand.entry(line.inventory_id.clone()).or_insert_with(|| {
                order.push(line.inventory_id.clone());
                0
            });
            *entry += line.quantity;
        }
        order
            .into_iter()
            .map(|id| {
                let qty = demand.get(&id).copied().unwrap_or_default();
                (id, qty)
            })
            .collect()
    }
}

/// Validates a bulk purchase against loaded rows and prices it.
///
/// ## Errors
/// The first failing check wins, in the order listed in the module docs.
/// Stock is checked cumulatively, so two lines for the same row cannot
/// together exceed it.
pub fn plan_purchase(user: &User, snapshots: Vec<ItemSnapshot>) -> CoreResult<PurchasePlan> {
    if snapshots.is_empty() {
        return Err(CoreError::invalid_argument("purchase must contain at least one item"));
    }

    let mut lines: Vec<PlannedLine> = Vec::with_capacity(snapshots.len());
    let mut reserved: HashMap<String, i64> = HashMap::new();

    for snapshot in snapshots {
        let ItemSnapshot {
            item,
            pharmacy,
            mask_type,
            inventory,
        } = snapshot;

        validate_purchase_quantity(item.quantity)?;

        let pharmacy = pharmacy.ok_or_else(|| CoreError::not_found("Pharmacy", &item.pharmacy_id))?;
        let mask_type = mask_type.ok_or_else(|| CoreError::not_found("MaskType", &item.mask_type_id))?;
        let inventory = inventory.ok_or_else(|| CoreError::NoStockRecord {
            pharmacy: pharmacy.name.clone(),
            mask: mask_type.label(),
        })?;

        let already = reserved.entry(inventory.id.clone()).or_insert(0);
        let requested = already
            .checked_add(item.quantity)
            .ok_or_else(|| CoreError::invalid_argument("requested quantity is too large"))?;
        if requested > inventory.quantity {
            return Err(CoreError::InsufficientStock {
                pharmacy: pharmacy.name.clone(),
                mask: mask_type.label(),
                available: inventory.quantity,
                requested,
            });
        }
        *already = requested;

        let unit_price = inventory.price();
        let line_total = unit_price
            .checked_multiply_quantity(item.quantity)
            .ok_or_else(|| CoreError::invalid_argument("line total is too large"))?;
        lines.push(PlannedLine {
            pharmacy_id: pharmacy.id,
            pharmacy_name: pharmacy.name,
            mask_type,
            inventory_id: inventory.id,
            quantity: item.quantity,
            unit_price,
            line_total,
        });
    }

    // Prices are non-negative, so no pharmacy subtotal can exceed this.
    let grand_total = Money::checked_sum(lines.iter().map(|line| line.line_total))
        .ok_or_else(|| CoreError::invalid_argument("purchase total is too large"))?;
    let previous_balance = user.cash_balance();
    if previous_balance < grand_total {
        return Err(CoreError::InsufficientFunds {
            user_id: user.id.clone(),
            available: previous_balance,
            required: grand_total,
        });
    }

    let groups = group_by_pharmacy(&lines);

    Ok(PurchasePlan {
        user_id: user.id.clone(),
        previous_balance,
        grand_total,
        lines,
        groups,
    })
}

fn group_by_pharmacy(lines: &[PlannedLine]) -> Vec<PharmacyGroup> {
    let mut groups: Vec<PharmacyGroup> = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        match groups.iter_mut().find(|g| g.pharmacy_id == line.pharmacy_id) {
            Some(group) => {
                group.subtotal += line.line_total;
                group.line_indices.push(index);
            }
            None => groups.push(PharmacyGroup {
                pharmacy_id: line.pharmacy_id.clone(),
                pharmacy_name: line.pharmacy_name.clone(),
                subtotal: line.line_total,
                line_indices: vec![index],
            }),
        }
    }
    groups
}

// =============================================================================
// Purchase Result
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseLineResult {
    pub pharmacy_id: String,
    pub pharmacy_name: String,
    pub mask_type_id: String,
    pub mask_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
}

impl From<&PlannedLine> for PurchaseLineResult {
    fn from(line: &PlannedLine) -> Self {
        PurchaseLineResult {
            pharmacy_id: line.pharmacy_id.clone(),
            pharmacy_name: line.pharmacy_name.clone(),
            mask_type_id: line.mask_type.id.clone(),
            mask_name: line.mask_type.label(),
            quantity: line.quantity,
            unit_price_cents: line.unit_price.cents(),
            total_price_cents: line.line_total.cents(),
        }
    }
}

/// Returned by a committed bulk purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseSummary {
    pub user_id: String,
    pub user_name: String,
    pub previous_balance_cents: i64,
    pub new_balance_cents: i64,
    pub total_amount_cents: i64,
    #[ts(as = "String")]
    pub transaction_date: DateTime<Utc>,
    /// One per pharmacy, in first-appearance order.
    pub purchase_history_ids: Vec<String>,
    pub items: Vec<PurchaseLineResult>,
}

impl PurchaseSummary {
    pub fn from_plan(
        plan: &PurchasePlan,
        user_name: &str,
        transaction_date: DateTime<Utc>,
        purchase_history_ids: Vec<String>,
    ) -> Self {
        PurchaseSummary {
            user_id: plan.user_id.clone(),
            user_name: user_name.to_string(),
            previous_balance_cents: plan.previous_balance.cents(),
            new_balance_cents: plan.new_balance().cents(),
            total_amount_cents: plan.grand_total.cents(),
            transaction_date,
            purchase_history_ids,
            items: plan.lines.iter().map(PurchaseLineResult::from).collect(),
        }
    }
}

// =============================================================================
// Cancellation
// =============================================================================

/// Checks that a purchase history may be cancelled against its pharmacy.
///
/// ## Errors
/// - `InvalidState` unless the status is DONE
/// - `PharmacyInsufficientFunds` if the refund would overdraw the pharmacy
pub fn check_cancellable(history: &PurchaseHistory, pharmacy: &Pharmacy) -> CoreResult<()> {
    if !history.status.is_cancellable() {
        return Err(CoreError::InvalidState {
            entity: "PurchaseHistory".to_string(),
            id: history.id.clone(),
            status: history.status.as_str().to_string(),
            reason: "only completed transactions can be cancelled".to_string(),
        });
    }

    let refund = history.transaction_amount();
    if pharmacy.cash_balance() < refund {
        return Err(CoreError::PharmacyInsufficientFunds {
            pharmacy_id: pharmacy.id.clone(),
            available: pharmacy.cash_balance(),
            required: refund,
        });
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CancelLineResult {
    pub mask_type_id: String,
    pub mask_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub refund_cents: i64,
    /// True when the inventory row was gone and had to be recreated.
    pub inventory_recreated: bool,
}

/// Returned by a committed cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CancelSummary {
    pub purchase_history_id: String,
    pub user_id: String,
    pub user_name: String,
    pub pharmacy_id: String,
    pub pharmacy_name: String,
    pub previous_balance_cents: i64,
    pub new_balance_cents: i64,
    pub refund_amount_cents: i64,
    pub status: TransactionStatus,
    #[ts(as = "String")]
    pub cancelled_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub original_transaction_date: DateTime<Utc>,
    pub items: Vec<CancelLineResult>,
}

// =============================================================================
// Unit Tests
// =============================================================================
