//! # Analytics
//!
//! Date-range parsing and top-spender aggregation over purchase records.
//!
//! ## Top Spenders
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  records in [start, end]  (ordered by user_id, then date DESC)         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  group by user ── sum transaction_amount, count records                │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  stable sort by total DESC ── ties keep grouping order                 │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  truncate to top_n                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::PurchaseRecord;

// =============================================================================
// Date Range
// =============================================================================

/// Which end of a range a date string describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Parses a range bound.
///
/// Accepted forms: RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS`,
/// and `YYYY-MM-DD`. A date-only start is midnight; a date-only end is the
/// last millisecond of that day. Times without an offset are UTC.
///
/// ## Example
/// ```rust
/// use maskstore_core::analytics::{parse_date_bound, Bound};
///
/// let end = parse_date_bound("end_date", "2024-01-31", Bound::End).unwrap();
/// assert_eq!(end.to_rfc3339(), "2024-01-31T23:59:59.999+00:00");
/// ```
pub fn parse_date_bound(field: &str, text: &str, bound: Bound) -> CoreResult<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| {
        CoreError::invalid_argument(format!("{field} is not a valid date: '{text}'"))
    })?;
    let time = match bound {
        Bound::Start => NaiveTime::MIN,
        Bound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
            .ok_or_else(|| CoreError::invalid_argument("end of day out of range"))?,
    };
    Ok(Utc.from_utc_datetime(&date.and_time(time)))
}

/// An inclusive `[start, end]` range, with the caller's raw text kept for echo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub raw_start: String,
    pub raw_end: String,
}

impl DateRange {
    /// Parses both bounds and requires `start < end`.
    pub fn parse(start_date: &str, end_date: &str) -> CoreResult<Self> {
        let start = parse_date_bound("start_date", start_date, Bound::Start)?;
        let end = parse_date_bound("end_date", end_date, Bound::End)?;
        if start >= end {
            return Err(CoreError::invalid_argument(format!(
                "start_date ({start_date}) must be earlier than end_date ({end_date})"
            )));
        }
        Ok(DateRange {
            start,
            end,
            raw_start: start_date.to_string(),
            raw_end: end_date.to_string(),
        })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

// =============================================================================
// Aggregation
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopSpender {
    pub user_id: String,
    pub name: String,
    pub total_spending_cents: i64,
    pub total_transactions: usize,
    pub purchase_records: Vec<PurchaseRecord>,
}

impl TopSpender {
    pub fn total_spending(&self) -> Money {
        Money::from_cents(self.total_spending_cents)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRangeEcho {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopSpendersReport {
    pub date_range: DateRangeEcho,
    pub top_n: u32,
    pub actual_count: usize,
    pub top_spenders: Vec<TopSpender>,
}

/// Groups `(user_name, record)` pairs by user and ranks by total spending.
///
/// Records are grouped in input order; a user's records keep the order in
/// which they arrived.
pub fn top_spenders(records: Vec<(String, PurchaseRecord)>, top_n: usize) -> Vec<TopSpender> {
    let mut spenders: Vec<TopSpender> = Vec::new();

    for (user_name, record) in records {
        let index = match spenders.iter().position(|s| s.user_id == record.user_id) {
            Some(index) => index,
            None => {
                spenders.push(TopSpender {
                    user_id: record.user_id.clone(),
                    name: user_name,
                    total_spending_cents: 0,
                    total_transactions: 0,
                    purchase_records: Vec::new(),
                });
                spenders.len() - 1
            }
        };
        let spender = &mut spenders[index];
        spender.total_spending_cents += record.transaction_amount_cents;
        spender.total_transactions += 1;
        spender.purchase_records.push(record);
    }

    // Vec::sort_by is stable
    spenders.sort_by(|a, b| b.total_spending_cents.cmp(&a.total_spending_cents));
    spenders.truncate(top_n);
    spenders
}

impl TopSpendersReport {
    pub fn new(range: &DateRange, top_n: u32, top_spenders: Vec<TopSpender>) -> Self {
        TopSpendersReport {
            date_range: DateRangeEcho {
                start_date: range.raw_start.clone(),
                end_date: range.raw_end.clone(),
            },
            top_n,
            actual_count: top_spenders.len(),
            top_spenders,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
