//! # Analytics Engine
//!
//! The top-spenders report.

use maskstore_core::analytics::{top_spenders, DateRange, TopSpendersReport};
use maskstore_core::validation::validate_top_n;
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use crate::config::EngineSettings;
use crate::error::DbResult;
use crate::repository::purchase;

/// Read-only reporting.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    pool: SqlitePool,
    settings: EngineSettings,
}

impl AnalyticsEngine {
    pub fn new(pool: SqlitePool, settings: EngineSettings) -> Self {
        AnalyticsEngine { pool, settings }
    }

    /// Ranks users by what they spent within `[start_date, end_date]`.
    ///
    /// Both bounds are inclusive. A date-only `end_date` covers that whole
    /// day. Histories of every status count. Users with equal totals keep
    /// the order their records were loaded in.
    ///
    /// ## Errors
    /// `InvalidArgument` for unparsable dates or `start_date >= end_date`;
    /// a validation error for `top_n` outside `1..=top_spenders_max`.
    #[instrument(skip(self))]
    pub async fn get_top_spenders(&self, start_date: &str, end_date: &str, top_n: u32) -> DbResult<TopSpendersReport> {
        validate_top_n(top_n, self.settings.top_spenders_max)?;
        let range = DateRange::parse(start_date, end_date)?;

        let mut conn = self.pool.acquire().await?;
        let records: Vec<_> = purchase::records_in_range(&mut conn, range.start, range.end)
            .await?
            .into_iter()
            .filter(|(_, record)| range.contains(record.transaction_date))
            .collect();

        debug!(records = records.len(), "Aggregating purchase records");
        let spenders = top_spenders(records, top_n as usize);

        Ok(TopSpendersReport::new(&range, top_n, spenders))
    }
}
