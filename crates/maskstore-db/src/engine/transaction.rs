//! # Transaction Engine
//!
//! Every state-changing operation: bulk purchase, cancellation, the two
//! administrative overwrites, and the bulk mask-product upsert.
//!
//! ## Purchase Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN (UnitOfWork)                                                    │
//! │    load user, then per item: pharmacy, mask type, inventory row        │
//! │    plan_purchase()  ── any rule fails ──► drop uow ──► ROLLBACK        │
//! │    debit user         WHERE balance >= total                           │
//! │    per pharmacy: insert history + details, credit pharmacy            │
//! │    per inventory row: take stock  WHERE quantity >= demand            │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every read and write of an operation goes through the same unit of work.
//! A guarded UPDATE that matches no row means another writer got there
//! first; the operation fails with the matching domain error and nothing
//! is applied.

use chrono::Utc;
use maskstore_core::admin::{
    BalanceUpdate, BulkUpsertSummary, InventoryUpdate, MaskProductInput, UpsertAction, UpsertedProduct,
};
use maskstore_core::purchase::{
    check_cancellable, plan_purchase, CancelLineResult, CancelSummary, ItemSnapshot, PurchaseItem,
    PurchaseSummary,
};
use maskstore_core::validation::{validate_balance_cents, validate_stock_quantity};
use maskstore_core::{
    CoreError, Inventory, MaskType, Money, PurchaseDetail, PurchaseHistory, TransactionStatus,
};
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{inventory, mask_type, new_id, pharmacy, purchase, user};
use crate::unit_of_work::UnitOfWork;

/// Atomic state-changing operations.
#[derive(Debug, Clone)]
pub struct TransactionEngine {
    pool: SqlitePool,
}

impl TransactionEngine {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionEngine { pool }
    }

    async fn begin(&self) -> DbResult<UnitOfWork> {
        UnitOfWork::begin(&self.pool).await
    }

    // =========================================================================
    // Purchase
    // =========================================================================

    /// Buys every item in one all-or-nothing transaction.
    ///
    /// ## Errors
    /// - `NotFound` for the user, or any item's pharmacy or mask type
    /// - `NoStockRecord` if a pharmacy does not stock the mask at all
    /// - `InsufficientStock` if the combined demand on a row exceeds it
    /// - `InsufficientFunds` if the grand total exceeds the user's balance
    #[instrument(skip(self, items), fields(item_count = items.len()))]
    pub async fn process_bulk_purchase(&self, user_id: &str, items: Vec<PurchaseItem>) -> DbResult<PurchaseSummary> {
        let mut uow = self.begin().await?;

        let buyer = user::find(uow.conn(), user_id)
            .await?
            .ok_or_else(|| DbError::not_found("User", user_id))?;

        let mut snapshots = Vec::with_capacity(items.len());
        for item in items {
            let pharmacy = pharmacy::find(uow.conn(), &item.pharmacy_id).await?;
            let mask_type = mask_type::find(uow.conn(), &item.mask_type_id).await?;
            let inventory = if pharmacy.is_some() && mask_type.is_some() {
                inventory::find_for(uow.conn(), &item.pharmacy_id, &item.mask_type_id).await?
            } else {
                None
            };
            snapshots.push(ItemSnapshot {
                item,
                pharmacy,
                mask_type,
                inventory,
            });
        }

        let plan = plan_purchase(&buyer, snapshots).map_err(|err| {
            warn!(user_id = %user_id, error = %err, "Purchase rejected");
            DbError::from(err)
        })?;

        if !user::debit(uow.conn(), &buyer.id, plan.grand_total).await? {
            let available = current_user_balance(&mut uow, &buyer.id).await?;
            return Err(CoreError::InsufficientFunds {
                user_id: buyer.id.clone(),
                available,
                required: plan.grand_total,
            }
            .into());
        }

        let transaction_date = Utc::now();
        let mut history_ids = Vec::with_capacity(plan.groups.len());

        for group in &plan.groups {
            let history = PurchaseHistory {
                id: new_id(),
                user_id: buyer.id.clone(),
                pharmacy_id: group.pharmacy_id.clone(),
                transaction_amount_cents: group.subtotal.cents(),
                transaction_date,
                status: TransactionStatus::Done,
            };
            purchase::insert_history(uow.conn(), &history).await?;

            for &index in &group.line_indices {
                let line = &plan.lines[index];
                let detail = PurchaseDetail {
                    id: new_id(),
                    purchase_history_id: history.id.clone(),
                    mask_type_id: line.mask_type.id.clone(),
                    quantity: line.quantity,
                    price_cents: line.unit_price.cents(),
                    total_price_cents: line.line_total.cents(),
                };
                purchase::insert_detail(uow.conn(), &detail).await?;
            }

            if !pharmacy::credit(uow.conn(), &group.pharmacy_id, group.subtotal).await? {
                return Err(DbError::not_found("Pharmacy", group.pharmacy_id.clone()));
            }
            history_ids.push(history.id);
        }

        for (inventory_id, demand) in plan.demand_by_inventory() {
            if inventory::take_stock(uow.conn(), &inventory_id, demand).await? {
                continue;
            }
            // Lost a race with another purchase on this row.
            let line = plan.lines.iter().find(|line| line.inventory_id == inventory_id);
            let available = current_stock(&mut uow, &inventory_id).await?;
            warn!(inventory_id = %inventory_id, demand, available, "Stock changed during purchase");
            return Err(CoreError::InsufficientStock {
                pharmacy: line.map(|l| l.pharmacy_name.clone()).unwrap_or_default(),
                mask: line.map(|l| l.mask_type.label()).unwrap_or_default(),
                available,
                requested: demand,
            }
            .into());
        }

        uow.commit().await?;

        info!(
            user_id = %buyer.id,
            total = %plan.grand_total,
            pharmacies = plan.groups.len(),
            lines = plan.lines.len(),
            "Bulk purchase committed"
        );

        Ok(PurchaseSummary::from_plan(&plan, &buyer.name, transaction_date, history_ids))
    }

    // =========================================================================
    // Cancellation
    // =========================================================================

    /// Reverses a completed purchase: refunds the user, charges back the
    /// pharmacy, and returns the stock.
    ///
    /// A stock row deleted since the purchase is recreated at the original
    /// unit price.
    ///
    /// ## Errors
    /// - `NotFound` for the user, or a history absent or owned by someone else
    /// - `InvalidState` if the history is not DONE
    /// - `PharmacyInsufficientFunds` if the refund would overdraw the pharmacy
    #[instrument(skip(self))]
    pub async fn cancel_transaction(&self, user_id: &str, purchase_history_id: &str) -> DbResult<CancelSummary> {
        let mut uow = self.begin().await?;

        let buyer = user::find(uow.conn(), user_id)
            .await?
            .ok_or_else(|| DbError::not_found("User", user_id))?;

        let history = purchase::find_history_for_user(uow.conn(), purchase_history_id, &buyer.id)
            .await?
            .ok_or_else(|| DbError::not_found("PurchaseHistory", purchase_history_id))?;

        let seller = pharmacy::find(uow.conn(), &history.pharmacy_id)
            .await?
            .ok_or_else(|| DbError::not_found("Pharmacy", history.pharmacy_id.clone()))?;

        check_cancellable(&history, &seller).map_err(|err| {
            warn!(purchase_history_id = %history.id, error = %err, "Cancellation rejected");
            DbError::from(err)
        })?;

        let details = purchase::details_for(uow.conn(), &history.id).await?;
        let refund = history.transaction_amount();
        let new_balance = buyer
            .cash_balance()
            .checked_add(refund)
            .ok_or_else(|| CoreError::invalid_argument("refund would overflow the user balance"))?;

        if !pharmacy::debit(uow.conn(), &seller.id, refund).await? {
            return Err(CoreError::PharmacyInsufficientFunds {
                pharmacy_id: seller.id.clone(),
                available: seller.cash_balance(),
                required: refund,
            }
            .into());
        }
        if !user::credit(uow.conn(), &buyer.id, refund).await? {
            return Err(DbError::not_found("User", buyer.id.clone()));
        }

        let mut items = Vec::with_capacity(details.len());
        for line in details {
            let existing = inventory::find_for(uow.conn(), &seller.id, &line.mask_type.id).await?;
            let recreated = match existing {
                Some(row) => {
                    if !inventory::restock(uow.conn(), &row.id, line.quantity).await? {
                        return Err(DbError::not_found("Inventory", row.id));
                    }
                    false
                }
                None => {
                    let row = Inventory {
                        id: new_id(),
                        pharmacy_id: seller.id.clone(),
                        mask_type_id: line.mask_type.id.clone(),
                        price_cents: line.price_cents,
                        quantity: line.quantity,
                    };
                    inventory::insert(uow.conn(), &row).await?;
                    true
                }
            };
            items.push(CancelLineResult {
                mask_name: line.mask_type.label(),
                mask_type_id: line.mask_type.id,
                quantity: line.quantity,
                unit_price_cents: line.price_cents,
                refund_cents: line.total_price_cents,
                inventory_recreated: recreated,
            });
        }

        if !purchase::mark_cancelled(uow.conn(), &history.id).await? {
            return Err(CoreError::InvalidState {
                entity: "PurchaseHistory".to_string(),
                id: history.id.clone(),
                status: TransactionStatus::Cancelled.as_str().to_string(),
                reason: "cancelled concurrently".to_string(),
            }
            .into());
        }

        uow.commit().await?;

        let cancelled_at = Utc::now();
        info!(
            purchase_history_id = %history.id,
            user_id = %buyer.id,
            refund = %refund,
            "Transaction cancelled"
        );

        Ok(CancelSummary {
            purchase_history_id: history.id,
            user_id: buyer.id,
            user_name: buyer.name,
            pharmacy_id: seller.id,
            pharmacy_name: seller.name,
            previous_balance_cents: buyer.cash_balance_cents,
            new_balance_cents: new_balance.cents(),
            refund_amount_cents: refund.cents(),
            status: TransactionStatus::Cancelled,
            cancelled_at,
            original_transaction_date: history.transaction_date,
            items,
        })
    }

    // =========================================================================
    // Administrative Overwrites
    // =========================================================================

    /// Sets a user's balance outright.
    #[instrument(skip(self))]
    pub async fn update_user_balance(
        &self,
        user_id: &str,
        new_balance_cents: i64,
        actor_id: &str,
    ) -> DbResult<BalanceUpdate> {
        validate_balance_cents(new_balance_cents)?;

        let mut uow = self.begin().await?;

        let target = user::find(uow.conn(), user_id)
            .await?
            .ok_or_else(|| DbError::not_found("User", user_id))?;

        let new_balance = Money::from_cents(new_balance_cents);
        if !user::set_balance(uow.conn(), &target.id, new_balance).await? {
            return Err(DbError::not_found("User", user_id));
        }

        uow.commit().await?;

        let delta = new_balance - target.cash_balance();
        info!(user_id = %target.id, delta = %delta, updated_by = %actor_id, "User balance overwritten");

        Ok(BalanceUpdate {
            user_id: target.id,
            user_name: target.name,
            previous_balance_cents: target.cash_balance_cents,
            new_balance_cents,
            delta_cents: delta.cents(),
            updated_at: Utc::now(),
            updated_by: actor_id.to_string(),
        })
    }

    /// Sets the on-hand quantity of one stock row outright.
    #[instrument(skip(self))]
    pub async fn update_inventory(
        &self,
        pharmacy_id: &str,
        mask_type_id: &str,
        new_quantity: i64,
    ) -> DbResult<InventoryUpdate> {
        validate_stock_quantity(new_quantity)?;

        let mut uow = self.begin().await?;

        let seller = pharmacy::find(uow.conn(), pharmacy_id)
            .await?
            .ok_or_else(|| DbError::not_found("Pharmacy", pharmacy_id))?;
        let mask = mask_type::find(uow.conn(), mask_type_id)
            .await?
            .ok_or_else(|| DbError::not_found("MaskType", mask_type_id))?;
        let row = inventory::find_for(uow.conn(), &seller.id, &mask.id)
            .await?
            .ok_or_else(|| DbError::not_found("Inventory", format!("{pharmacy_id}/{mask_type_id}")))?;

        if !inventory::set_quantity(uow.conn(), &row.id, new_quantity).await? {
            return Err(DbError::not_found("Inventory", row.id));
        }
        uow.commit().await?;

        info!(
            inventory_id = %row.id,
            previous = row.quantity,
            new = new_quantity,
            "Inventory overwritten"
        );

        Ok(InventoryUpdate {
            inventory_id: row.id,
            pharmacy_id: seller.id,
            pharmacy_name: seller.name,
            mask_type_id: mask.id.clone(),
            mask_name: mask.label(),
            previous_quantity: row.quantity,
            new_quantity,
            delta: new_quantity - row.quantity,
            updated_at: Utc::now(),
        })
    }

    // =========================================================================
    // Bulk Upsert
    // =========================================================================

    /// Creates or updates mask types and this pharmacy's stock of them.
    ///
    /// Every product is validated before anything is written. Mask types
    /// are resolved by explicit id first, then by `(brand, color, pack_size)`.
    #[instrument(skip(self, products), fields(product_count = products.len()))]
    pub async fn bulk_upsert_mask_products(
        &self,
        pharmacy_id: &str,
        products: Vec<MaskProductInput>,
    ) -> DbResult<BulkUpsertSummary> {
        if products.is_empty() {
            return Err(CoreError::invalid_argument("at least one product is required").into());
        }
        for product in &products {
            product.validate()?;
        }

        let mut uow = self.begin().await?;

        let seller = pharmacy::find(uow.conn(), pharmacy_id)
            .await?
            .ok_or_else(|| DbError::not_found("Pharmacy", pharmacy_id))?;

        let mut processed = Vec::with_capacity(products.len());
        for product in &products {
            let (mask, mask_created) = resolve_mask_type(&mut uow, product).await?;

            let price = Money::from_cents(product.price_cents);
            let (inventory_id, inventory_created) =
                match inventory::find_for(uow.conn(), &seller.id, &mask.id).await? {
                    Some(row) => {
                        if !inventory::set_price_and_quantity(uow.conn(), &row.id, price, product.quantity).await? {
                            return Err(DbError::not_found("Inventory", row.id));
                        }
                        (row.id, false)
                    }
                    None => {
                        let row = Inventory {
                            id: new_id(),
                            pharmacy_id: seller.id.clone(),
                            mask_type_id: mask.id.clone(),
                            price_cents: product.price_cents,
                            quantity: product.quantity,
                        };
                        inventory::insert(uow.conn(), &row).await?;
                        (row.id, true)
                    }
                };

            processed.push(UpsertedProduct {
                mask_type_id: mask.id,
                inventory_id,
                brand: mask.brand,
                color: mask.color,
                pack_size: mask.pack_size,
                display_name: mask.display_name,
                price_cents: product.price_cents,
                quantity: product.quantity,
                action: UpsertAction::classify(mask_created, inventory_created),
            });
        }

        uow.commit().await?;

        let summary = BulkUpsertSummary::new(seller.id, seller.name, processed, Utc::now());
        info!(
            pharmacy_id = %summary.pharmacy_id,
            created = summary.created_count,
            updated = summary.updated_count,
            "Mask products upserted"
        );

        Ok(summary)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Find-or-create of a mask type. Returns the stored type and whether it
/// was created.
async fn resolve_mask_type(uow: &mut UnitOfWork, product: &MaskProductInput) -> DbResult<(MaskType, bool)> {
    if let Some(id) = &product.mask_type_id {
        let existing = mask_type::find(uow.conn(), id)
            .await?
            .ok_or_else(|| DbError::not_found("MaskType", id.clone()))?;
        let updated = product.to_mask_type(existing.id);
        if !mask_type::update(uow.conn(), &updated).await? {
            return Err(DbError::not_found("MaskType", updated.id));
        }
        return Ok((updated, false));
    }

    match mask_type::find_by_key(uow.conn(), &product.key()).await? {
        Some(mut existing) => {
            let display_name = product.display_name.trim().to_string();
            if !mask_type::update_display_name(uow.conn(), &existing.id, &display_name).await? {
                return Err(DbError::not_found("MaskType", existing.id));
            }
            existing.display_name = display_name;
            Ok((existing, false))
        }
        None => {
            let created = product.to_mask_type(new_id());
            mask_type::insert(uow.conn(), &created).await?;
            Ok((created, true))
        }
    }
}

async fn current_user_balance(uow: &mut UnitOfWork, user_id: &str) -> DbResult<Money> {
    Ok(user::find(uow.conn(), user_id)
        .await?
        .map(|u| u.cash_balance())
        .unwrap_or_else(Money::zero))
}

async fn current_stock(uow: &mut UnitOfWork, inventory_id: &str) -> DbResult<i64> {
    Ok(inventory::find(uow.conn(), inventory_id)
        .await?
        .map(|row| row.quantity)
        .unwrap_or_default())
}
