//! # Unit of Work
//!
//! Scoped all-or-nothing block around one SQLite transaction.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  let mut uow = db.begin().await?;        BEGIN                         │
//! │       │                                                                 │
//! │       ├── repository::user::find(uow.conn(), ..)?                      │
//! │       ├── repository::inventory::take_stock(uow.conn(), ..)?          │
//! │       │        │                                                        │
//! │       │        └── any `?` returns early ── uow dropped ── ROLLBACK    │
//! │       ▼                                                                 │
//! │  uow.commit().await?;                    COMMIT                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing written through a unit of work is visible to other connections
//! until `commit` returns.

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::debug;

use crate::error::DbResult;

/// An open transaction. Commits only when told to.
#[derive(Debug)]
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub(crate) async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let tx = pool.begin().await?;
        debug!("Unit of work started");
        Ok(UnitOfWork { tx })
    }

    /// The transaction's connection, for repository calls.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.tx
    }

    /// Makes every write in this unit durable and visible.
    pub async fn commit(self) -> DbResult<()> {
        self.tx.commit().await?;
        debug!("Unit of work committed");
        Ok(())
    }

    /// Discards every write in this unit.
    ///
    /// Dropping the unit does the same; this form reports errors.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx.rollback().await?;
        debug!("Unit of work rolled back");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
