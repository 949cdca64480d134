//! Local time windows and day spans.
//!
//! [`TimeWindow`] is a half-open `[start, end)` range of local times, used
//! for the bucket index's materialized window and for range queries.
//! [`days_spanned`] lists the days an occurrence occupies.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Midnight at the start of `date`.
pub fn day_start(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// The days touched by `[start, end)`, end exclusive at midnight.
///
/// A zero-length span still occupies its start day.
pub fn days_spanned(start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDate> {
    let first = start.date();
    let last = if end > start {
        (end - Duration::nanoseconds(1)).date()
    } else {
        first
    };
    first.iter_days().take_while(|day| *day <= last).collect()
}

/// A half-open range of local times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: NaiveDateTime,
    /// End of the window (exclusive).
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Creates a new time window. A reversed range becomes empty.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Creates a window covering `days` whole days from `date`.
    pub fn for_days(date: NaiveDate, days: u32) -> Self {
        let start = day_start(date);
        Self::new(start, start + Duration::days(i64::from(days)))
    }

    /// Creates a window covering one day.
    pub fn for_date(date: NaiveDate) -> Self {
        Self::for_days(date, 1)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if a time falls within this window.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }

    /// True if `other` lies entirely within this window.
    pub fn covers(&self, other: &TimeWindow) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Checks if `[start, end)` overlaps this window. Zero-length spans
    /// overlap when their instant is contained.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        if end <= start {
            return self.contains(start);
        }
        start < self.end && end > self.start
    }

    /// Extends the window by `before` and `after`.
    #[must_use]
    pub fn extend(&self, before: Duration, after: Duration) -> Self {
        Self::new(self.start - before, self.end + after)
    }

    /// The smallest window covering both.
    #[must_use]
    pub fn union(&self, other: &TimeWindow) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// The days this window touches.
    pub fn days(&self) -> Vec<NaiveDate> {
        if self.is_empty() {
            return Vec::new();
        }
        days_spanned(self.start, self.end)
    }
}
