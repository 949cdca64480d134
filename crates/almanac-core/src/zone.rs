//! Time zone conversion for display.
//!
//! Events store local times in their own zone. The bucket index places
//! occurrences by the time they have in the *view* zone, through the
//! [`ZoneConverter`] seam. [`ViewZone`] is the `chrono-tz` backed
//! implementation.

use std::str::FromStr;

use chrono::{Duration, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use tracing::trace;

use crate::error::{Error, Result};

/// Largest shift in hours a conversion can apply; UTC offsets span -12h
/// to +14h.
pub const MAX_ZONE_SHIFT_HOURS: i64 = 26;

/// Maps event-local times to view-local times.
pub trait ZoneConverter {
    /// Converts `local`, expressed in `zone` (floating when `None`), to
    /// the view zone.
    fn to_view(&self, local: NaiveDateTime, zone: Option<&str>) -> NaiveDateTime;

    /// True if conversions can move times at all.
    fn shifts(&self) -> bool;
}

/// The zone a calendar is displayed in. Floating views show every time
/// as written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewZone(Option<Tz>);

impl ViewZone {
    pub fn floating() -> Self {
        Self(None)
    }

    /// Resolves an IANA zone name.
    pub fn parse(name: &str) -> Result<Self> {
        resolve(name).map(|tz| Self(Some(tz)))
    }

    pub fn name(&self) -> Option<&'static str> {
        self.0.map(|tz| tz.name())
    }
}

impl ZoneConverter for ViewZone {
    fn to_view(&self, local: NaiveDateTime, zone: Option<&str>) -> NaiveDateTime {
        let (Some(view), Some(name)) = (self.0, zone) else {
            return local;
        };
        let Ok(source) = resolve(name) else {
            trace!(zone = name, "Unknown event zone, treating as floating");
            return local;
        };
        if source == view {
            return local;
        }
        let resolved = match source.from_local_datetime(&local) {
            LocalResult::Single(at) => Some(at),
            // Folds resolve to the earlier instant.
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            // Gaps shift forward past the transition.
            LocalResult::None => source
                .from_local_datetime(&(local + Duration::hours(1)))
                .earliest(),
        };
        resolved.map_or(local, |at| at.with_timezone(&view).naive_local())
    }

    fn shifts(&self) -> bool {
        self.0.is_some()
    }
}

fn resolve(name: &str) -> Result<Tz> {
    Tz::from_str(name).map_err(|_| Error::invalid_time_zone(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn floating_is_identity() {
        let view = ViewZone::floating();
        let at = dt(2024, 3, 10, 9, 0);
        assert_eq!(view.to_view(at, Some("America/New_York")), at);
        assert!(!view.shifts());
    }

    #[test]
    fn converts_between_zones() {
        let view = ViewZone::parse("Europe/Paris").unwrap();
        assert_eq!(view.name(), Some("Europe/Paris"));
        assert_eq!(
            view.to_view(dt(2024, 1, 15, 9, 0), Some("America/New_York")),
            dt(2024, 1, 15, 15, 0)
        );
        // Floating event times are shown as written.
        assert_eq!(view.to_view(dt(2024, 1, 15, 9, 0), None), dt(2024, 1, 15, 9, 0));
    }

    #[test]
    fn crosses_day_boundary() {
        let view = ViewZone::parse("Asia/Tokyo").unwrap();
        assert_eq!(
            view.to_view(dt(2024, 1, 15, 20, 0), Some("UTC")),
            dt(2024, 1, 16, 5, 0)
        );
    }

    #[test]
    fn gap_shifts_forward() {
        let view = ViewZone::parse("UTC").unwrap();
        // 02:30 does not exist in New York on 2024-03-10.
        assert_eq!(
            view.to_view(dt(2024, 3, 10, 2, 30), Some("America/New_York")),
            dt(2024, 3, 10, 7, 30)
        );
    }

    #[test]
    fn fold_takes_earliest() {
        let view = ViewZone::parse("UTC").unwrap();
        // 01:30 happens twice in New York on 2024-11-03; first at EDT.
        assert_eq!(
            view.to_view(dt(2024, 11, 3, 1, 30), Some("America/New_York")),
            dt(2024, 11, 3, 5, 30)
        );
    }

    #[test]
    fn rejects_unknown_zone() {
        assert!(matches!(
            ViewZone::parse("Mars/Olympus"),
            Err(Error::InvalidTimeZone { .. })
        ));
    }
}
