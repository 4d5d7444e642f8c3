//! # maskstore-db: Persistence and Engines for the Mask Store
//!
//! SQLite storage through sqlx, and the four engines built on it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mask Store Data Flow                             │
//! │                                                                         │
//! │  API layer (authenticated request)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   maskstore-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Engines     │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │  (engine/)    │    │ (repository/) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ Transaction   │───►│ pharmacy      │    │ 001_initial  │  │   │
//! │  │   │ Query         │    │ inventory     │    │   _schema    │  │   │
//! │  │   │ Search        │    │ purchase ...  │    │              │  │   │
//! │  │   │ Analytics     │    └───────────────┘    └──────────────┘  │   │
//! │  │   └───────────────┘            ▲                               │   │
//! │  │          │ UnitOfWork ─────────┘                               │   │
//! │  │          ▼                                                      │   │
//! │  │   maskstore-core (rules, planning, scoring; no I/O)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`config`] - Environment-driven configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`unit_of_work`] - Scoped transactions
//! - [`repository`] - Row-level queries per table
//! - [`engine`] - Transaction, query, search and analytics operations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use maskstore_db::{Database, StoreConfig};
//!
//! let config = StoreConfig::load()?;
//! let db = Database::new(config.db_config()).await?.with_settings(config.engine);
//!
//! let summary = db.transactions().process_bulk_purchase(&user_id, items).await?;
//! let page = db.search().search(&SearchRequest::new("mask")).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, EngineSettings, StoreConfig};
pub use engine::{AnalyticsEngine, QueryEngine, SearchEngine, SearchRequest, TransactionEngine};
pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig};
pub use unit_of_work::UnitOfWork;
