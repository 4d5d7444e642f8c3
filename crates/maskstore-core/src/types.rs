//! # Domain Types
//!
//! Entities of the mask marketplace and the read views assembled from them.
//!
//! ## Entity Graph
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Pharmacy ──< Inventory >── MaskType                                   │
//! │     │  └──< PharmacyHour >── Weekday                                   │
//! │     │                                                                   │
//! │     └──< PurchaseHistory >── User                                      │
//! │                 └──< PurchaseDetail >── MaskType                        │
//! │                                                                         │
//! │  Every arrow is an id field. No entity holds a reference to another;    │
//! │  traversal always goes through an explicit repository query.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Money columns
//! Monetary fields are stored as `*_cents: i64` and exposed as [`Money`]
//! through accessor methods.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::hours::Weekday;
use crate::money::Money;

// =============================================================================
// Pharmacy
// =============================================================================

/// A pharmacy selling masks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Pharmacy {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    /// Cash balance in cents, never negative after a committed operation.
    pub cash_balance_cents: i64,

    /// Raw opening-hours text as supplied with the pharmacy record,
    /// e.g. `"Mon, Wed, Fri 08:00 - 12:00 / Tue, Thur 14:00 - 18:00"`.
    pub opening_hours: Option<String>,
}

impl Pharmacy {
    #[inline]
    pub fn cash_balance(&self) -> Money {
        Money::from_cents(self.cash_balance_cents)
    }
}

// =============================================================================
// User
// =============================================================================

/// A buyer holding a cash balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub cash_balance_cents: i64,
}

impl User {
    #[inline]
    pub fn cash_balance(&self) -> Money {
        Money::from_cents(self.cash_balance_cents)
    }
}

// =============================================================================
// Mask Type
// =============================================================================

/// A product definition, independent of any pharmacy.
///
/// ## Identity
/// Either the explicit `id`, or the natural key `(brand, color, pack_size)`
/// used by the administrative upsert ([`MaskTypeKey`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct MaskType {
    pub id: String,
    pub brand: String,
    pub color: String,
    pub pack_size: i64,
    pub display_name: String,
}

impl MaskType {
    /// Name used in search results and summaries.
    ///
    /// Falls back to `"{brand} {color}"` when no display name is set.
    pub fn label(&self) -> String {
        if self.display_name.trim().is_empty() {
            format!("{} {}", self.brand, self.color).trim().to_string()
        } else {
            self.display_name.clone()
        }
    }

    /// Returns the natural key of this mask type.
    pub fn key(&self) -> MaskTypeKey {
        MaskTypeKey {
            brand: self.brand.clone(),
            color: self.color.clone(),
            pack_size: self.pack_size,
        }
    }
}

/// Composite lookup key for find-or-create of mask types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaskTypeKey {
    pub brand: String,
    pub color: String,
    pub pack_size: i64,
}

// =============================================================================
// Inventory
// =============================================================================

/// The price and quantity one pharmacy offers for one mask type.
///
/// At most one row exists per `(pharmacy_id, mask_type_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Inventory {
    pub id: String,
    pub pharmacy_id: String,
    pub mask_type_id: String,
    pub price_cents: i64,
    pub quantity: i64,
}

impl Inventory {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// An inventory row joined with its mask type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryLine {
    pub inventory_id: String,
    pub pharmacy_id: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub mask_type: MaskType,
}

impl InventoryLine {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Opening Hours
// =============================================================================

/// One open interval of a pharmacy on one weekday.
///
/// `is_overnight` is a stored fact: the interval starts on `weekday` and ends
/// after midnight. It is never re-derived from the two times at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PharmacyHour {
    pub id: String,
    pub pharmacy_id: String,
    /// Weekday ordinal, Monday = 1 .. Sunday = 7.
    pub weekday_id: i64,
    #[ts(as = "String")]
    pub open_time: NaiveTime,
    #[ts(as = "String")]
    pub close_time: NaiveTime,
    pub is_overnight: bool,
}

impl PharmacyHour {
    pub fn weekday(&self) -> Option<Weekday> {
        Weekday::from_ordinal(self.weekday_id)
    }
}

/// An opening hour as returned to callers, weekday resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OpeningHour {
    pub weekday: Weekday,
    /// Three-letter form, e.g. `"Thu"`.
    pub weekday_short: String,
    #[ts(as = "String")]
    pub open_time: NaiveTime,
    #[ts(as = "String")]
    pub close_time: NaiveTime,
    pub is_overnight: bool,
}

impl OpeningHour {
    /// Resolves a stored hour. Rows with an unknown weekday ordinal are skipped.
    pub fn from_hour(hour: &PharmacyHour) -> Option<Self> {
        let weekday = hour.weekday()?;
        Some(OpeningHour {
            weekday,
            weekday_short: weekday.short_name().to_string(),
            open_time: hour.open_time,
            close_time: hour.close_time,
            is_overnight: hour.is_overnight,
        })
    }
}

/// A pharmacy with its inventory and opening hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreView {
    pub pharmacy: Pharmacy,
    /// Sorted by mask display name.
    pub inventories: Vec<InventoryLine>,
    /// Sorted by weekday ordinal.
    pub opening_hours: Vec<OpeningHour>,
}

// =============================================================================
// Purchase History
// =============================================================================

/// Status of a purchase history record.
///
/// ```text
/// DONE ──cancelTransaction──► CANCELLED   (one-way)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Done,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Done => "done",
            TransactionStatus::Cancelled => "cancelled",
        }
    }

    /// Only completed purchases may be cancelled.
    #[inline]
    pub fn is_cancellable(&self) -> bool {
        matches!(self, TransactionStatus::Done)
    }
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Done
    }
}

/// One committed transaction between a user and a single pharmacy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseHistory {
    pub id: String,
    pub user_id: String,
    pub pharmacy_id: String,
    /// Sum of the line totals bought from this pharmacy.
    pub transaction_amount_cents: i64,
    #[ts(as = "String")]
    pub transaction_date: DateTime<Utc>,
    pub status: TransactionStatus,
}

impl PurchaseHistory {
    #[inline]
    pub fn transaction_amount(&self) -> Money {
        Money::from_cents(self.transaction_amount_cents)
    }
}

/// Immutable line item of a purchase history.
///
/// `total_price_cents == price_cents * quantity` always.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseDetail {
    pub id: String,
    pub purchase_history_id: String,
    pub mask_type_id: String,
    pub quantity: i64,
    /// Unit price at time of purchase (frozen).
    pub price_cents: i64,
    pub total_price_cents: i64,
}

impl PurchaseDetail {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

/// A purchase detail joined with its mask type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseDetailLine {
    pub purchase_detail_id: String,
    pub quantity: i64,
    pub price_cents: i64,
    pub total_price_cents: i64,
    pub mask_type: MaskType,
}

/// A purchase history with its pharmacy and expanded line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseRecord {
    pub purchase_history_id: String,
    pub user_id: String,
    pub pharmacy_id: String,
    pub pharmacy_name: String,
    pub transaction_amount_cents: i64,
    #[ts(as = "String")]
    pub transaction_date: DateTime<Utc>,
    pub status: TransactionStatus,
    pub purchase_details: Vec<PurchaseDetailLine>,
}

impl PurchaseRecord {
    #[inline]
    pub fn transaction_amount(&self) -> Money {
        Money::from_cents(self.transaction_amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
