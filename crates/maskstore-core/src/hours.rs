//! # Opening Hours
//!
//! Weekday normalization and the time-window predicate used by store listing.
//!
//! ## Window Matching
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Regular block  Mon 08:00 ──────────────── 18:00                       │
//! │  query          [start ≥ open ........ end ≤ close]                    │
//! │                                                                         │
//! │  Overnight block  Fri 22:00 ──── 24:00 │ 00:00 ──── 02:00               │
//! │                   pre-midnight segment │ post-midnight segment         │
//! │                                                                         │
//! │  A query window matches an overnight block when it sits wholly in      │
//! │  the pre-midnight segment, wholly in the post-midnight segment, or     │
//! │  itself wraps midnight inside the block (23:00 - 01:00).               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `is_overnight` comes from the stored hour row. It is never recomputed
//! from the open/close times here.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{OpeningHour, StoreView};

// =============================================================================
// Weekday
// =============================================================================

/// Calendar weekday with a stable ordinal (Monday = 1 .. Sunday = 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Ordinal stored as `weekdays.id`.
    pub const fn ordinal(&self) -> i64 {
        match self {
            Weekday::Monday => 1,
            Weekday::Tuesday => 2,
            Weekday::Wednesday => 3,
            Weekday::Thursday => 4,
            Weekday::Friday => 5,
            Weekday::Saturday => 6,
            Weekday::Sunday => 7,
        }
    }

    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        Weekday::ALL.iter().copied().find(|d| d.ordinal() == ordinal)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    pub const fn short_name(&self) -> &'static str {
        match self {
            Weekday::Monday => "Mon",
            Weekday::Tuesday => "Tue",
            Weekday::Wednesday => "Wed",
            Weekday::Thursday => "Thu",
            Weekday::Friday => "Fri",
            Weekday::Saturday => "Sat",
            Weekday::Sunday => "Sun",
        }
    }

    /// Parses a full name or abbreviation, case-insensitively.
    ///
    /// ## Example
    /// ```rust
    /// use maskstore_core::hours::Weekday;
    ///
    /// assert_eq!(Weekday::parse("monday"), Some(Weekday::Monday));
    /// assert_eq!(Weekday::parse("Thur"), Some(Weekday::Thursday));
    /// assert_eq!(Weekday::parse("Funday"), None);
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let lowered = text.trim().to_lowercase();
        match lowered.as_str() {
            "thur" | "thurs" => return Some(Weekday::Thursday),
            "tues" => return Some(Weekday::Tuesday),
            _ => {}
        }
        Weekday::ALL.iter().copied().find(|day| {
            day.name().eq_ignore_ascii_case(&lowered) || day.short_name().eq_ignore_ascii_case(&lowered)
        })
    }
}

/// Normalizes caller-supplied weekday names.
///
/// Unrecognized names are dropped silently. The result is sorted by ordinal
/// and free of duplicates.
pub fn normalize_weekdays<S: AsRef<str>>(names: &[S]) -> Vec<Weekday> {
    let mut days: Vec<Weekday> = names
        .iter()
        .filter_map(|name| Weekday::parse(name.as_ref()))
        .collect();
    days.sort();
    days.dedup();
    days
}

// =============================================================================
// Time Window
// =============================================================================

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(field: &str, text: &str) -> CoreResult<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .map_err(|_| CoreError::invalid_argument(format!("{field} must be HH:MM or HH:MM:SS, got '{text}'")))
}

/// The `[start_time, end_time)` query window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Builds a window from optional bounds.
    ///
    /// Both bounds or neither; one without the other is `InvalidArgument`.
    pub fn from_bounds(start: Option<NaiveTime>, end: Option<NaiveTime>) -> CoreResult<Option<Self>> {
        match (start, end) {
            (Some(start), Some(end)) => Ok(Some(TimeWindow { start, end })),
            (None, None) => Ok(None),
            _ => Err(CoreError::invalid_argument(
                "start_time and end_time must be provided together",
            )),
        }
    }

    /// Whether the window crosses midnight (e.g. 23:00 - 01:00).
    #[inline]
    pub fn wraps(&self) -> bool {
        self.start > self.end
    }

    /// Whether an opening block covers this window.
    ///
    /// A daytime block never covers a window that wraps midnight.
    pub fn fits(&self, open: NaiveTime, close: NaiveTime, is_overnight: bool) -> bool {
        let (start, end) = (self.start, self.end);

        if !is_overnight {
            return start <= end && start >= open && end <= close;
        }

        if self.wraps() {
            return start >= open && end <= close;
        }

        let pre_midnight = start >= open && end >= open;
        let post_midnight = start <= close && end <= close;
        pre_midnight || post_midnight
    }
}

// =============================================================================
// Hour Filter
// =============================================================================

/// Optional opening-hours constraints for store listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreFilter {
    /// Full names or abbreviations; unknown names are ignored.
    #[serde(default)]
    pub weekdays: Vec<String>,
    #[ts(as = "Option<String>")]
    pub start_time: Option<NaiveTime>,
    #[ts(as = "Option<String>")]
    pub end_time: Option<NaiveTime>,
}

/// A validated [`StoreFilter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HourPredicate {
    weekdays: Vec<Weekday>,
    window: Option<TimeWindow>,
    weekdays_requested: bool,
}

impl HourPredicate {
    pub fn compile(filter: &StoreFilter) -> CoreResult<Self> {
        let window = TimeWindow::from_bounds(filter.start_time, filter.end_time)?;
        Ok(HourPredicate {
            weekdays: normalize_weekdays(&filter.weekdays),
            window,
            weekdays_requested: !filter.weekdays.is_empty(),
        })
    }

    /// Whether this predicate constrains anything at all.
    pub fn is_active(&self) -> bool {
        self.weekdays_requested || self.window.is_some()
    }

    pub fn matches(&self, hour: &OpeningHour) -> bool {
        if self.weekdays_requested && !self.weekdays.contains(&hour.weekday) {
            return false;
        }
        match &self.window {
            Some(window) => window.fits(hour.open_time, hour.close_time, hour.is_overnight),
            None => true,
        }
    }

    /// Keeps matching hours on each store and drops stores left without any.
    ///
    /// An inactive predicate returns the stores untouched.
    pub fn apply(&self, stores: Vec<StoreView>) -> Vec<StoreView> {
        if !self.is_active() {
            return stores;
        }
        stores
            .into_iter()
            .filter_map(|mut store| {
                store.opening_hours.retain(|hour| self.matches(hour));
                (!store.opening_hours.is_empty()).then_some(store)
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
