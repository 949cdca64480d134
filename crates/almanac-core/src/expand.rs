//! Window-bounded occurrence expansion.
//!
//! [`OccurrenceExpander::expand`] drives the [`CycleIterator`] across a
//! requested window and enforces `count`/`until`;
//! [`OccurrenceExpander::expand_event`] layers a [`RecurringEvent`]'s
//! inclusions and exceptions on top.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cycle::{CycleIterator, advance, periods_between};
use crate::date_key::DateKey;
use crate::event::RecurringEvent;
use crate::rule::{DayCode, Frequency, RuleSpec};

/// Hard cap on occurrences returned by one call.
pub const DEFAULT_RESULT_CAP: usize = 16_384;

/// Series length used when a rule has no `count`, `until` or window end.
pub const DEFAULT_UNBOUNDED_COUNT: u32 = 2;

/// Expansion limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Maximum occurrences returned by one expansion.
    pub result_cap: usize,

    /// Series length applied when nothing else bounds an expansion.
    /// `None` leaves only `result_cap` as the bound.
    pub unbounded_count: Option<u32>,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            result_cap: DEFAULT_RESULT_CAP,
            unbounded_count: Some(DEFAULT_UNBOUNDED_COUNT),
        }
    }
}

impl ExpansionConfig {
    /// Builder: set the result cap.
    pub fn with_result_cap(mut self, cap: usize) -> Self {
        self.result_cap = cap.max(1);
        self
    }

    /// Builder: set the unbounded series length.
    pub fn with_unbounded_count(mut self, count: Option<u32>) -> Self {
        self.unbounded_count = count;
        self
    }
}

/// Expands rules and events into concrete occurrences.
///
/// Pure: the same inputs always give the same output, so one expander
/// can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceExpander {
    config: ExpansionConfig,
}

impl OccurrenceExpander {
    /// Creates an expander with the given limits.
    pub fn new(config: ExpansionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExpansionConfig {
        &self.config
    }

    /// Returns the strictly increasing occurrences of `rule` anchored at
    /// `start` that fall in `[begin, end)`.
    ///
    /// - `begin` defaults to (and is raised to) `start`.
    /// - `until` tightens `end` to `until + 1s`, so `until` is inclusive.
    /// - `count` bounds the series from `start`, not the window.
    /// - `start` itself is always the first member of the series.
    pub fn expand(
        &self,
        rule: &RuleSpec,
        start: NaiveDateTime,
        begin: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Vec<NaiveDateTime> {
        let begin = begin.filter(|b| *b > start).unwrap_or(start);

        let mut end = end;
        if let Some(until) = rule.until() {
            let bound = until + Duration::seconds(1);
            end = Some(end.map_or(bound, |e| e.min(bound)));
        }

        let mut count = rule.count();
        if end.is_none() && count.is_none() {
            count = self.config.unbounded_count;
        }

        if end.is_some_and(|e| begin >= e) || count == Some(0) {
            return Vec::new();
        }
        let before_end = |at: NaiveDateTime| end.is_none_or(|e| at < e);

        let mut out = Vec::new();
        let mut series_len: u32 = 0;
        if before_end(start) {
            series_len = 1;
            if start >= begin {
                out.push(start);
            }
        }
        let mut last = start;
        if count.is_some_and(|n| series_len >= n) || !before_end(start) {
            return out;
        }

        let rule = iteration_rule(rule, start);
        let iter = CycleIterator::new(&rule);
        let mut anchor = if count.is_some() || begin == start {
            Some(start)
        } else {
            aligned_anchor(&rule, start, begin)
        };

        'cycles: while let Some(at) = anchor {
            let cycle = iter.next_cycle(at);
            anchor = cycle.next_anchor;
            let Some(candidates) = cycle.candidates else {
                debug!(anchor = %at, "Rule exhausted its attempt ceiling");
                break;
            };

            for candidate in candidates {
                if candidate <= last {
                    continue;
                }
                if !before_end(candidate) {
                    break 'cycles;
                }
                last = candidate;
                series_len = series_len.saturating_add(1);
                if candidate >= begin {
                    out.push(candidate);
                    if out.len() >= self.config.result_cap {
                        warn!(cap = self.config.result_cap, "Expansion hit the result cap");
                        break 'cycles;
                    }
                }
                if count.is_some_and(|n| series_len >= n) {
                    break 'cycles;
                }
            }
        }

        out
    }

    /// Returns the strictly increasing date-keys of `event` whose
    /// effective start falls in `[begin, end)`.
    ///
    /// Rule occurrences and inclusions are merged, removed occurrences are
    /// dropped, and occurrences whose patched start moves them into or out
    /// of the window are added or dropped accordingly.
    pub fn expand_event(
        &self,
        event: &RecurringEvent,
        begin: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Vec<DateKey> {
        let start = event.start();
        let begin = begin.filter(|b| *b > start).unwrap_or(start);
        if end.is_some_and(|e| begin >= e) {
            return Vec::new();
        }
        let in_window = |at: NaiveDateTime| at >= begin && end.is_none_or(|e| at < e);

        let mut keys: BTreeSet<DateKey> = match event.rule() {
            Some(rule) => self
                .expand(rule, start, Some(begin), end)
                .into_iter()
                .map(DateKey::from_datetime)
                .collect(),
            None => in_window(start)
                .then(|| DateKey::from_datetime(start))
                .into_iter()
                .collect(),
        };

        keys.extend(
            event
                .inclusions()
                .iter()
                .filter(|at| in_window(**at))
                .map(|at| DateKey::from_datetime(*at)),
        );

        if let Some(exceptions) = event.exceptions() {
            for (key, exception) in exceptions.iter() {
                if exception.is_removed() {
                    keys.remove(key);
                    continue;
                }
                if !exception.overrides_timing() {
                    continue;
                }
                let shifted_in = in_window(event.effective_start(key));
                if !shifted_in {
                    keys.remove(key);
                } else if !keys.contains(key) && self.is_occurrence(event, key) {
                    keys.insert(key.clone());
                }
            }
        }

        keys.into_iter().collect()
    }

    /// Returns true if `key` names an occurrence of `event` (rule-generated,
    /// the start itself, or an inclusion), ignoring exceptions.
    pub fn is_occurrence(&self, event: &RecurringEvent, key: &DateKey) -> bool {
        let at = key.to_datetime();
        if at == event.start() || event.inclusions().contains(&at) {
            return true;
        }
        match event.rule() {
            Some(rule) if at > event.start() => self
                .expand(rule, event.start(), Some(at), Some(at + Duration::seconds(1)))
                .first()
                == Some(&at),
            _ => false,
        }
    }
}

/// Fills in the selectors a rule leaves implicit, taken from `start`.
///
/// A rule with `by_*` parts but no day selector for its period means "on
/// the start's day". A rule without any `by_*` part whose start day might
/// not exist in every period (day 29-31 for monthly or yearly) is pinned
/// to that day explicitly so the clamping of month arithmetic can never
/// shift it. `byWeekNo` is dropped from anything but yearly rules.
pub fn iteration_rule(rule: &RuleSpec, start: NaiveDateTime) -> RuleSpec {
    if rule.frequency() != Frequency::Yearly && !rule.by_week_no().is_empty() {
        debug!(frequency = rule.frequency().as_str(), "Ignoring byWeekNo on non-yearly rule");
        return iteration_rule(&rule.clone().with_by_week_no(Vec::new()), start);
    }

    let day = start.day() as i32;
    let month = start.month() as i32;
    let weekday = start.weekday();
    let has_day_selector = !rule.by_day().is_empty()
        || !rule.by_month_day().is_empty()
        || !rule.by_year_day().is_empty();

    if !rule.has_restrictions() {
        return if is_complex_anchor(rule.frequency(), start) {
            match rule.frequency() {
                Frequency::Yearly => rule
                    .clone()
                    .with_by_month([month])
                    .with_by_month_day(vec![day]),
                _ => rule.clone().with_by_month_day(vec![day]),
            }
        } else {
            rule.clone()
        };
    }

    match rule.frequency() {
        Frequency::Yearly if !has_day_selector => {
            if !rule.by_week_no().is_empty() {
                rule.clone().with_day_codes(vec![DayCode::new(weekday, None)])
            } else if rule.by_month().is_empty() {
                rule.clone()
                    .with_by_month([month])
                    .with_by_month_day(vec![day])
            } else {
                rule.clone().with_by_month_day(vec![day])
            }
        }
        Frequency::Monthly if !has_day_selector => {
            rule.clone().with_by_month_day(vec![day])
        }
        Frequency::Weekly if !has_day_selector => {
            rule.clone().with_day_codes(vec![DayCode::new(weekday, None)])
        }
        _ => rule.clone(),
    }
}

/// True when `start`'s day-of-month does not occur in every period.
pub fn is_complex_anchor(frequency: Frequency, start: NaiveDateTime) -> bool {
    matches!(frequency, Frequency::Monthly | Frequency::Yearly) && start.day() > 28
}

/// The cycle anchor at or before `begin` that lies a whole number of
/// intervals after `start`.
fn aligned_anchor(
    rule: &RuleSpec,
    start: NaiveDateTime,
    begin: NaiveDateTime,
) -> Option<NaiveDateTime> {
    let interval = i64::from(rule.interval());
    let periods = periods_between(start, begin, rule.frequency(), rule.first_day_of_week());
    let skip = periods - periods.rem_euclid(interval);
    if skip <= 0 {
        return Some(start);
    }
    advance(start, rule.frequency(), skip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, s).unwrap()
    }

    fn listing(values: &[NaiveDateTime]) -> String {
        values
            .iter()
            .map(|v| DateKey::from_datetime(*v).to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn expander() -> OccurrenceExpander {
        OccurrenceExpander::default()
    }

    /// Full scan from start, filtered to the window afterwards.
    fn reference(
        rule: &RuleSpec,
        start: NaiveDateTime,
        begin: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Vec<NaiveDateTime> {
        expander()
            .expand(rule, start, None, Some(end))
            .into_iter()
            .filter(|at| *at >= begin)
            .collect()
    }

    mod scenarios {
        use super::*;

        #[test]
        fn biweekly_monday_wednesday() {
            let rule = RuleSpec::new(Frequency::Weekly)
                .with_interval(2)
                .with_by_day([(Weekday::Mon, None), (Weekday::Wed, None)]);
            let got = expander().expand(
                &rule,
                dt(2024, 1, 1, 0, 0, 0),
                Some(dt(2024, 1, 1, 0, 0, 0)),
                Some(dt(2024, 2, 1, 0, 0, 0)),
            );
            insta::assert_snapshot!(listing(&got), @r"
            2024-01-01T00:00:00
            2024-01-03T00:00:00
            2024-01-15T00:00:00
            2024-01-17T00:00:00
            2024-01-29T00:00:00
            2024-01-31T00:00:00
            ");
        }

        #[test]
        fn month_day_31_skips_short_months() {
            let rule = RuleSpec::new(Frequency::Monthly)
                .with_by_month_day(vec![31])
                .with_count(Some(4));
            let got = expander().expand(&rule, dt(2024, 1, 31, 9, 0, 0), None, None);
            insta::assert_snapshot!(listing(&got), @r"
            2024-01-31T09:00:00
            2024-03-31T09:00:00
            2024-05-31T09:00:00
            2024-07-31T09:00:00
            ");
        }

        #[test]
        fn plain_monthly_from_31st_is_not_clamped() {
            let rule = RuleSpec::new(Frequency::Monthly).with_count(Some(3));
            let got = expander().expand(&rule, dt(2024, 1, 31, 9, 0, 0), None, None);
            assert_eq!(
                got,
                vec![dt(2024, 1, 31, 9, 0, 0), dt(2024, 3, 31, 9, 0, 0), dt(2024, 5, 31, 9, 0, 0)]
            );
        }

        #[test]
        fn yearly_leap_day() {
            let rule = RuleSpec::new(Frequency::Yearly).with_count(Some(3));
            let got = expander().expand(&rule, dt(2024, 2, 29, 0, 0, 0), None, None);
            assert_eq!(
                got,
                vec![dt(2024, 2, 29, 0, 0, 0), dt(2028, 2, 29, 0, 0, 0), dt(2032, 2, 29, 0, 0, 0)]
            );
        }

        #[test]
        fn yearly_by_month_takes_start_day() {
            let rule = RuleSpec::new(Frequency::Yearly)
                .with_by_month([3, 6])
                .with_count(Some(3));
            let got = expander().expand(&rule, dt(2024, 1, 10, 8, 0, 0), None, None);
            // The start itself counts as the first member of the series.
            assert_eq!(
                got,
                vec![dt(2024, 1, 10, 8, 0, 0), dt(2024, 3, 10, 8, 0, 0), dt(2024, 6, 10, 8, 0, 0)]
            );
        }

        #[test]
        fn weekly_by_hour_takes_start_weekday() {
            let rule = RuleSpec::new(Frequency::Weekly).with_by_hour(vec![9, 14]);
            let got = expander().expand(
                &rule,
                dt(2024, 1, 2, 9, 0, 0),
                None,
                Some(dt(2024, 1, 10, 0, 0, 0)),
            );
            assert_eq!(
                got,
                vec![
                    dt(2024, 1, 2, 9, 0, 0),
                    dt(2024, 1, 2, 14, 0, 0),
                    dt(2024, 1, 9, 9, 0, 0),
                    dt(2024, 1, 9, 14, 0, 0),
                ]
            );
        }
        #[test]
        fn weekly_positional_day_matches_every_week() {
            let rule = RuleSpec::from_json(
                r#"{"frequency":"weekly","byDay":[{"day":"mo","nthOfPeriod":2}]}"#,
            )
            .unwrap();
            let got = expander().expand(
                &rule,
                dt(2024, 1, 1, 9, 0, 0),
                None,
                Some(dt(2024, 3, 1, 0, 0, 0)),
            );
            assert_eq!(got.len(), 9);
            assert!(got.iter().all(|at| at.weekday() == chrono::Weekday::Mon));
            assert_eq!(got.last(), Some(&dt(2024, 2, 26, 9, 0, 0)));
        }

        #[test]
        fn monthly_ignores_week_numbers() {
            let rule = RuleSpec::new(Frequency::Monthly)
                .with_by_week_no(vec![10])
                .with_count(Some(3));
            let got = expander().expand(&rule, dt(2024, 1, 4, 9, 0, 0), None, None);
            assert_eq!(
                got,
                vec![dt(2024, 1, 4, 9, 0, 0), dt(2024, 2, 4, 9, 0, 0), dt(2024, 3, 4, 9, 0, 0)]
            );
        }
    }

    mod bounds {
        use super::*;

        #[test]
        fn start_included_even_when_rule_does_not_match() {
            // 2024-01-02 is a Tuesday
            let rule = RuleSpec::new(Frequency::Weekly).with_by_day([(Weekday::Fri, None)]);
            let got = expander().expand(
                &rule,
                dt(2024, 1, 2, 10, 0, 0),
                None,
                Some(dt(2024, 1, 13, 0, 0, 0)),
            );
            assert_eq!(
                got,
                vec![dt(2024, 1, 2, 10, 0, 0), dt(2024, 1, 5, 10, 0, 0), dt(2024, 1, 12, 10, 0, 0)]
            );
        }

        #[test]
        fn until_is_inclusive() {
            let rule = RuleSpec::new(Frequency::Daily).with_until(Some(dt(2024, 1, 3, 9, 0, 0)));
            let got = expander().expand(
                &rule,
                dt(2024, 1, 1, 9, 0, 0),
                None,
                Some(dt(2024, 2, 1, 0, 0, 0)),
            );
            assert_eq!(got.len(), 3);
            assert_eq!(got.last(), Some(&dt(2024, 1, 3, 9, 0, 0)));
        }

        #[test]
        fn unbounded_defaults_to_two() {
            let rule = RuleSpec::new(Frequency::Daily);
            let got = expander().expand(&rule, dt(2024, 1, 1, 9, 0, 0), None, None);
            assert_eq!(got, vec![dt(2024, 1, 1, 9, 0, 0), dt(2024, 1, 2, 9, 0, 0)]);

            let open = OccurrenceExpander::new(
                ExpansionConfig::default()
                    .with_unbounded_count(None)
                    .with_result_cap(10),
            );
            assert_eq!(open.expand(&rule, dt(2024, 1, 1, 9, 0, 0), None, None).len(), 10);
        }

        #[test]
        fn inverted_window_is_empty() {
            let rule = RuleSpec::new(Frequency::Daily);
            let got = expander().expand(
                &rule,
                dt(2024, 1, 1, 9, 0, 0),
                Some(dt(2024, 3, 1, 0, 0, 0)),
                Some(dt(2024, 2, 1, 0, 0, 0)),
            );
            assert!(got.is_empty());
        }

        #[test]
        fn count_bounds_series_not_window() {
            let rule = RuleSpec::new(Frequency::Daily).with_count(Some(5));
            let start = dt(2024, 1, 1, 9, 0, 0);
            let full = expander().expand(&rule, start, None, None);
            assert_eq!(full.len(), 5);
            for (i, at) in full.iter().enumerate() {
                let narrow =
                    expander().expand(&rule, start, Some(*at), Some(*at + Duration::hours(1)));
                assert_eq!(narrow, vec![full[i]]);
            }
            let late = expander().expand(
                &rule,
                start,
                Some(dt(2024, 1, 4, 0, 0, 0)),
                Some(dt(2024, 2, 1, 0, 0, 0)),
            );
            assert_eq!(late, vec![dt(2024, 1, 4, 9, 0, 0), dt(2024, 1, 5, 9, 0, 0)]);
        }

        #[test]
        fn never_matching_rule_exhausts() {
            let rule = RuleSpec::new(Frequency::Monthly).with_by_month_day(vec![32]);
            let got = expander().expand(
                &rule,
                dt(2024, 1, 1, 0, 0, 0),
                None,
                Some(dt(2030, 1, 1, 0, 0, 0)),
            );
            assert_eq!(got, vec![dt(2024, 1, 1, 0, 0, 0)]);
        }

        #[test]
        fn idempotent() {
            let rule = RuleSpec::new(Frequency::Monthly).with_by_day([(Weekday::Tue, Some(2))]);
            let start = dt(2023, 6, 13, 18, 0, 0);
            let window = (Some(dt(2024, 1, 1, 0, 0, 0)), Some(dt(2025, 1, 1, 0, 0, 0)));
            let a = expander().expand(&rule, start, window.0, window.1);
            let b = expander().expand(&rule, start, window.0, window.1);
            assert_eq!(a, b);
            assert_eq!(a.len(), 12);
        }
    }

    mod anchoring {
        use super::*;

        fn assert_windows_match(rule: &RuleSpec, start: NaiveDateTime) {
            let end = start + Duration::days(4 * 366);
            let mut begin = start + Duration::days(17);
            while begin < end {
                let windowed = expander().expand(rule, start, Some(begin), Some(end));
                let scanned = reference(rule, start, begin, end);
                assert_eq!(windowed, scanned, "start {start}, begin {begin}");
                for pair in windowed.windows(2) {
                    assert!(pair[0] < pair[1]);
                }
                begin += Duration::days(41);
            }
        }

        #[test]
        fn every_start_day_monthly() {
            for interval in [1, 2, 5] {
                let rule = RuleSpec::new(Frequency::Monthly).with_interval(interval);
                for day in 1..=31 {
                    let start = dt(2023, 1, day, 7, 30, 0);
                    assert_windows_match(&rule, start);
                }
            }
        }

        #[test]
        fn every_start_day_yearly() {
            let rule = RuleSpec::new(Frequency::Yearly);
            for (month, last) in [(1, 31), (2, 29), (4, 30), (12, 31)] {
                for day in 1..=last {
                    let start = dt(2024, month, day, 12, 0, 0);
                    let end = start + Duration::days(20 * 366);
                    let begin = start + Duration::days(800);
                    let windowed = expander().expand(&rule, start, Some(begin), Some(end));
                    let scanned = reference(&rule, start, begin, end);
                    assert_eq!(windowed, scanned, "start {start}");
                }
            }
        }

        #[test]
        fn weekly_and_daily_intervals() {
            let weekly = RuleSpec::new(Frequency::Weekly)
                .with_interval(3)
                .with_first_day_of_week(Weekday::Sun)
                .with_by_day([(Weekday::Sat, None), (Weekday::Sun, None)]);
            assert_windows_match(&weekly, dt(2024, 1, 6, 10, 0, 0));

            let daily = RuleSpec::new(Frequency::Daily).with_interval(4);
            assert_windows_match(&daily, dt(2024, 1, 1, 23, 0, 0));

            let positional = RuleSpec::new(Frequency::Monthly)
                .with_interval(2)
                .with_by_day([(Weekday::Fri, Some(-1))]);
            assert_windows_match(&positional, dt(2024, 1, 26, 16, 0, 0));
        }

        #[test]
        fn complex_anchor_boundary() {
            assert!(!is_complex_anchor(Frequency::Monthly, dt(2024, 1, 28, 0, 0, 0)));
            assert!(is_complex_anchor(Frequency::Monthly, dt(2024, 1, 29, 0, 0, 0)));
            assert!(is_complex_anchor(Frequency::Yearly, dt(2024, 2, 29, 0, 0, 0)));
            assert!(!is_complex_anchor(Frequency::Weekly, dt(2024, 1, 31, 0, 0, 0)));
        }
    }
}
