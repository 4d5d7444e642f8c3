//! # Repository Module
//!
//! SQL for every table, one module per aggregate.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and Connections                         │
//! │                                                                         │
//! │  Every function takes `conn: &mut SqliteConnection`, so the same SQL   │
//! │  runs against a pooled connection (read-only engines) or inside a      │
//! │  UnitOfWork (transaction engine):                                      │
//! │                                                                         │
//! │  let mut conn = pool.acquire().await?;                                 │
//! │  pharmacy::list_all(&mut conn).await?                                  │
//! │                                                                         │
//! │  let mut uow = db.begin().await?;                                      │
//! │  user::debit(uow.conn(), &user_id, total).await?                       │
//! │                                                                         │
//! │  Guarded writes (`debit`, `take_stock`, `mark_cancelled`) return       │
//! │  whether a row was changed. A `false` means the guard lost a race,     │
//! │  and the engine turns it into a domain error.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`pharmacy`] - Pharmacies and their balances
//! - [`user`] - Users and their balances
//! - [`mask_type`] - Mask types and the natural-key lookup
//! - [`inventory`] - Stock rows and joined inventory lines
//! - [`hours`] - Opening hours
//! - [`purchase`] - Purchase histories and details

pub mod hours;
pub mod inventory;
pub mod mask_type;
pub mod pharmacy;
pub mod purchase;
pub mod user;

use uuid::Uuid;

/// Generates a new primary key.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
