//! # Engines
//!
//! The operations callers use. Each engine owns a pool handle and is cheap
//! to clone.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Database::transactions() / queries() / search() / analytics()         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Engine (this module)                                                  │
//! │   - loads rows through `repository::*`                                 │
//! │   - hands them to the pure `maskstore_core` functions                  │
//! │   - writes the outcome back (transaction engine only)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  repository::* (free functions over &mut SqliteConnection)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Engine | Writes | Connection |
//! |--------|--------|------------|
//! | [`TransactionEngine`] | yes | one [`UnitOfWork`](crate::UnitOfWork) per operation |
//! | [`QueryEngine`] | no | pooled |
//! | [`SearchEngine`] | no | pooled |
//! | [`AnalyticsEngine`] | no | pooled |

mod analytics;
mod query;
mod search;
mod transaction;

pub use analytics::AnalyticsEngine;
pub use query::QueryEngine;
pub use search::{SearchEngine, SearchRequest};
pub use transaction::TransactionEngine;
