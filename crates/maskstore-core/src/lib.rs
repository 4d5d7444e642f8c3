//! # maskstore-core: Pure Business Logic for the Mask Marketplace
//!
//! Pharmacies sell mask products to users, users hold cash balances, and
//! administrators manage inventory and pricing. This crate holds every rule
//! of that marketplace as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Maskstore Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              External API layer (HTTP, auth, DTOs)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          maskstore-db (engines, units of work, SQLite)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ maskstore-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   types    money    hours    inventory    search                │   │
//! │  │   purchase    admin    analytics    validation    error          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO CLOCK                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Pharmacy, User, MaskType, Inventory, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`hours`] - Weekdays and opening-hour window matching
//! - [`inventory`] - Inventory sorting and price/quantity predicates
//! - [`search`] - Relevance scoring, edit distance, ranked pagination
//! - [`purchase`] - Multi-item purchase planning and result shapes
//! - [`analytics`] - Top-spender aggregation and date-range bounds
//! - [`admin`] - Balance/stock overwrites and bulk product upsert shapes
//! - [`validation`] - Field-level input checks
//! - [`error`] - Domain error types and error kinds
//!
//! ## Example Usage
//!
//! ```rust
//! use maskstore_core::search::relevance;
//!
//! assert_eq!(relevance("care", "Care"), 1.0);
//! assert_eq!(relevance("care", "Carewell"), 0.8);
//! assert_eq!(relevance("care", "DayCare Plus"), 0.6);
//! ```

pub mod admin;
pub mod analytics;
pub mod error;
pub mod hours;
pub mod inventory;
pub mod money;
pub mod purchase;
pub mod search;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size used by search when the caller does not pass one.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Largest page a single search call may request.
pub const MAX_SEARCH_LIMIT: u32 = 100;

/// Largest `top_n` accepted by the top-spenders report.
pub const MAX_TOP_N: u32 = 100;

/// Edit distance beyond which a fuzzy match scores zero.
pub const FUZZY_MAX_DISTANCE: usize = 2;

/// Column limits for mask type text fields.
pub const MAX_BRAND_LEN: usize = 255;
pub const MAX_COLOR_LEN: usize = 100;
pub const MAX_DISPLAY_NAME_LEN: usize = 255;
