//! Per-cycle candidate generation.
//!
//! A cycle is one period of the rule's frequency (a year, a month, a week
//! aligned to the rule's first day of week, a day, an hour...). The
//! [`CycleIterator`] turns an anchor date-time into the sorted candidates
//! of the anchor's period and the anchor of the next period `interval`
//! periods later.
//!
//! Candidate generation:
//! 1. No `by_*` parts: the anchor itself is the only candidate.
//! 2. Otherwise every day of the period is a candidate day and the day
//!    filters (`byMonth`, `byWeekNo`, `byYearDay`, `byMonthDay`, `byDay`)
//!    keep a day when one of its positions (counted from the start of the
//!    period, from its end, or "no position") is in the allowed set.
//! 3. `byHour`/`byMinute`/`bySecond` expand each day when the frequency is
//!    coarser than the field, and filter the anchor's time otherwise.
//! 4. `bySetPosition` picks from the sorted survivors of the whole cycle.

use std::collections::HashSet;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use tracing::trace;

use crate::rule::{Frequency, RuleSpec, encode_day};

/// Result of one [`CycleIterator::next_cycle`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Sorted candidates of the first non-empty cycle, or `None` if the
    /// attempt ceiling was reached without finding one.
    pub candidates: Option<Vec<NaiveDateTime>>,
    /// Anchor of the cycle after the one examined last. `None` once date
    /// arithmetic leaves the representable range.
    pub next_anchor: Option<NaiveDateTime>,
}

/// Generates candidates cycle by cycle for one rule.
#[derive(Debug, Clone)]
pub struct CycleIterator<'a> {
    rule: &'a RuleSpec,
    day_codes: HashSet<i32>,
}

impl<'a> CycleIterator<'a> {
    /// Creates an iterator for a rule.
    ///
    /// `nthOfPeriod` only counts for monthly and yearly rules; finer
    /// frequencies match the bare weekday.
    pub fn new(rule: &'a RuleSpec) -> Self {
        let positional = matches!(rule.frequency(), Frequency::Yearly | Frequency::Monthly);
        let day_codes = rule
            .by_day()
            .iter()
            .filter_map(|code| {
                if positional {
                    code.code()
                } else {
                    code.weekday().map(|day| encode_day(day, 0))
                }
            })
            .collect();
        Self { rule, day_codes }
    }

    /// Returns the candidates of the first non-empty cycle at or after
    /// `anchor`, trying at most the frequency's attempt ceiling.
    pub fn next_cycle(&self, anchor: NaiveDateTime) -> Cycle {
        let ceiling = self.rule.frequency().attempt_ceiling();
        let mut current = Some(anchor);

        for _ in 0..ceiling {
            let Some(at) = current else { break };
            let candidates = self.candidates(at);
            current = advance(at, self.rule.frequency(), i64::from(self.rule.interval()));
            if !candidates.is_empty() {
                return Cycle {
                    candidates: Some(candidates),
                    next_anchor: current,
                };
            }
        }

        trace!(
            anchor = %anchor,
            ceiling = ceiling,
            frequency = self.rule.frequency().as_str(),
            "No candidates within attempt ceiling"
        );
        Cycle {
            candidates: None,
            next_anchor: current,
        }
    }

    /// Returns the sorted, de-duplicated candidates of the anchor's period.
    pub fn candidates(&self, anchor: NaiveDateTime) -> Vec<NaiveDateTime> {
        if !self.rule.has_restrictions() {
            return vec![anchor];
        }

        let times = self.times(anchor.time());
        if times.is_empty() {
            return Vec::new();
        }

        let mut out: Vec<NaiveDateTime> = self
            .period_days(anchor.date())
            .filter(|day| self.day_matches(*day))
            .flat_map(|day| times.iter().map(move |time| day.and_time(*time)))
            .collect();
        out.sort_unstable();
        out.dedup();

        if self.rule.by_set_position().is_empty() {
            out
        } else {
            select_positions(&out, self.rule.by_set_position())
        }
    }

    /// Every day of the period containing `date`.
    fn period_days(&self, date: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        let (first, len) = match self.rule.frequency() {
            Frequency::Yearly => (first_of_year(date), days_in_year(date.year())),
            Frequency::Monthly => (first_of_month(date), days_in_month(date.year(), date.month())),
            Frequency::Weekly => (week_start(date, self.rule.first_day_of_week()), 7),
            _ => (date, 1),
        };
        first.iter_days().take(len as usize)
    }

    fn day_matches(&self, day: NaiveDate) -> bool {
        let rule = self.rule;

        if !rule.by_month().is_empty() && !rule.by_month().contains(&(day.month0() as i32)) {
            return false;
        }

        if rule.frequency() == Frequency::Yearly && !rule.by_week_no().is_empty() {
            let (forward, backward) = week_number(day, rule.first_day_of_week());
            if !rule.by_week_no().iter().any(|w| *w == forward || *w == backward) {
                return false;
            }
        }

        if !rule.by_year_day().is_empty() {
            let forward = day.ordinal() as i32;
            let backward = forward - days_in_year(day.year()) as i32 - 1;
            if !rule.by_year_day().iter().any(|d| *d == forward || *d == backward) {
                return false;
            }
        }

        if !rule.by_month_day().is_empty() {
            let forward = day.day() as i32;
            let backward = forward - days_in_month(day.year(), day.month()) as i32 - 1;
            if !rule.by_month_day().iter().any(|d| *d == forward || *d == backward) {
                return false;
            }
        }

        if !rule.by_day().is_empty() {
            let (scope_first, scope_last) = self.nth_scope(day);
            let forward = (day - scope_first).num_days() as i32 / 7 + 1;
            let backward = (scope_last - day).num_days() as i32 / 7 + 1;
            let weekday = day.weekday();
            let positions = [
                encode_day(weekday, 0),
                encode_day(weekday, forward),
                encode_day(weekday, -backward),
            ];
            if !positions.iter().any(|code| self.day_codes.contains(code)) {
                return false;
            }
        }

        true
    }

    /// The span that `nthOfPeriod` counts within: the year for yearly
    /// rules without `byMonth`, otherwise the month.
    fn nth_scope(&self, day: NaiveDate) -> (NaiveDate, NaiveDate) {
        if self.rule.frequency() == Frequency::Yearly && self.rule.by_month().is_empty() {
            let first = first_of_year(day);
            let len = i64::from(days_in_year(day.year()));
            return (first, first + Duration::days(len - 1));
        }
        let first = first_of_month(day);
        let len = i64::from(days_in_month(day.year(), day.month()));
        (first, first + Duration::days(len - 1))
    }

    /// Times of day for each candidate day.
    fn times(&self, anchor: NaiveTime) -> Vec<NaiveTime> {
        let frequency = self.rule.frequency();
        let Some(hours) = expand_or_filter(
            self.rule.by_hour(),
            anchor.hour(),
            frequency < Frequency::Hourly,
        ) else {
            return Vec::new();
        };
        let Some(minutes) = expand_or_filter(
            self.rule.by_minute(),
            anchor.minute(),
            frequency < Frequency::Minutely,
        ) else {
            return Vec::new();
        };
        let Some(seconds) = expand_or_filter(
            self.rule.by_second(),
            anchor.second(),
            frequency < Frequency::Secondly,
        ) else {
            return Vec::new();
        };

        let mut times = Vec::with_capacity(hours.len() * minutes.len() * seconds.len());
        for hour in &hours {
            for minute in &minutes {
                for second in &seconds {
                    if let Some(time) = NaiveTime::from_hms_opt(*hour, *minute, *second) {
                        times.push(time);
                    }
                }
            }
        }
        times
    }
}

/// For a time field: the expansion list when the rule is coarser than the
/// field, otherwise the anchor's own value if it passes the filter.
/// `None` means the anchor's value is filtered out.
fn expand_or_filter(values: &[u32], anchor: u32, expands: bool) -> Option<Vec<u32>> {
    if values.is_empty() {
        Some(vec![anchor])
    } else if expands {
        let mut values = values.to_vec();
        values.sort_unstable();
        values.dedup();
        Some(values)
    } else if values.contains(&anchor) {
        Some(vec![anchor])
    } else {
        None
    }
}

/// Picks the 1-based (or negative, from the end) positions of a sorted list.
fn select_positions(sorted: &[NaiveDateTime], positions: &[i32]) -> Vec<NaiveDateTime> {
    let len = sorted.len() as i64;
    let mut picked: Vec<NaiveDateTime> = positions
        .iter()
        .filter_map(|position| {
            let position = i64::from(*position);
            let index = match position {
                p if p > 0 => p - 1,
                p if p < 0 => len + p,
                _ => return None,
            };
            usize::try_from(index).ok().and_then(|i| sorted.get(i)).copied()
        })
        .collect();
    picked.sort_unstable();
    picked.dedup();
    picked
}

/// Moves `at` forward by `periods` units of `frequency`.
///
/// Month arithmetic clamps to the end of shorter months; callers that
/// cannot tolerate the clamp use a day-generating rule instead.
pub fn advance(at: NaiveDateTime, frequency: Frequency, periods: i64) -> Option<NaiveDateTime> {
    let months = |n: i64| u32::try_from(n).ok().map(Months::new);
    match frequency {
        Frequency::Yearly => at.checked_add_months(months(periods.checked_mul(12)?)?),
        Frequency::Monthly => at.checked_add_months(months(periods)?),
        Frequency::Weekly => at.checked_add_signed(Duration::try_weeks(periods)?),
        Frequency::Daily => at.checked_add_signed(Duration::try_days(periods)?),
        Frequency::Hourly => at.checked_add_signed(Duration::try_hours(periods)?),
        Frequency::Minutely => at.checked_add_signed(Duration::try_minutes(periods)?),
        Frequency::Secondly => at.checked_add_signed(Duration::try_seconds(periods)?),
    }
}

/// Number of whole periods of `frequency` from `from`'s period to `to`'s.
///
/// Calendar frequencies count period boundaries crossed; clock
/// frequencies count elapsed units, rounding towards `from`.
pub fn periods_between(
    from: NaiveDateTime,
    to: NaiveDateTime,
    frequency: Frequency,
    week_starts_on: Weekday,
) -> i64 {
    match frequency {
        Frequency::Yearly => i64::from(to.year() - from.year()),
        Frequency::Monthly => {
            i64::from(to.year() - from.year()) * 12 + i64::from(to.month0())
                - i64::from(from.month0())
        }
        Frequency::Weekly => {
            (week_start(to.date(), week_starts_on) - week_start(from.date(), week_starts_on))
                .num_days()
                / 7
        }
        Frequency::Daily => (to.date() - from.date()).num_days(),
        Frequency::Hourly => (to - from).num_hours(),
        Frequency::Minutely => (to - from).num_minutes(),
        Frequency::Secondly => (to - from).num_seconds(),
    }
}

/// First day of the week containing `date`.
pub fn week_start(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let offset = (7 + date.weekday().num_days_from_monday() - first_day.num_days_from_monday()) % 7;
    date - Duration::days(i64::from(offset))
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if is_leap_year(year) => 29,
        _ => 28,
    }
}

pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) { 366 } else { 365 }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn first_of_year(date: NaiveDate) -> NaiveDate {
    date.with_ordinal(1).unwrap_or(date)
}

/// Start of week 1 of `year`: the first week with at least four days in
/// the year.
fn first_week_start(year: i32, first_day: Weekday) -> Option<NaiveDate> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let start = week_start(jan1, first_day);
    let days_before = (jan1 - start).num_days();
    Some(if days_before <= 3 {
        start
    } else {
        start + Duration::days(7)
    })
}

/// Week number of `date` counted forward from week 1, and backward from
/// the last week (as a negative number).
pub fn week_number(date: NaiveDate, first_day: Weekday) -> (i32, i32) {
    let mut year = date.year();
    let (Some(mut begin), Some(mut next)) = (
        first_week_start(year, first_day),
        first_week_start(year + 1, first_day),
    ) else {
        return (0, 0);
    };
    if date < begin {
        year -= 1;
        next = begin;
        begin = first_week_start(year, first_day).unwrap_or(begin);
    } else if date >= next {
        begin = next;
        next = first_week_start(year + 2, first_day).unwrap_or(next);
    }
    let weeks = ((next - begin).num_days() / 7) as i32;
    let forward = ((date - begin).num_days() / 7) as i32 + 1;
    (forward, forward - weeks - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, s).unwrap()
    }

    fn keys(values: &[NaiveDateTime]) -> Vec<String> {
        values.iter().map(|v| v.format("%Y-%m-%d %H:%M").to_string()).collect()
    }

    mod calendar_math {
        use super::*;

        #[test]
        fn month_lengths() {
            assert_eq!(days_in_month(2024, 2), 29);
            assert_eq!(days_in_month(2023, 2), 28);
            assert_eq!(days_in_month(1900, 2), 28);
            assert_eq!(days_in_month(2000, 2), 29);
            assert_eq!(days_in_month(2024, 4), 30);
            assert_eq!(days_in_year(2024), 366);
        }

        #[test]
        fn week_start_respects_first_day() {
            // 2024-01-03 is a Wednesday
            assert_eq!(week_start(date(2024, 1, 3), Weekday::Mon), date(2024, 1, 1));
            assert_eq!(week_start(date(2024, 1, 3), Weekday::Sun), date(2023, 12, 31));
            assert_eq!(week_start(date(2024, 1, 1), Weekday::Mon), date(2024, 1, 1));
        }

        #[test]
        fn week_numbers_match_iso_for_monday() {
            // ISO: 2021-01-03 belongs to 2020-W53, 2024-12-30 to 2025-W01
            assert_eq!(week_number(date(2021, 1, 3), Weekday::Mon).0, 53);
            assert_eq!(week_number(date(2021, 1, 4), Weekday::Mon).0, 1);
            assert_eq!(week_number(date(2024, 12, 30), Weekday::Mon).0, 1);
            assert_eq!(week_number(date(2024, 12, 29), Weekday::Mon), (52, -1));
            for day in date(2023, 1, 1).iter_days().take(800) {
                assert_eq!(
                    week_number(day, Weekday::Mon).0 as u32,
                    day.iso_week().week(),
                    "{day}"
                );
            }
        }

        #[test]
        fn advance_clamps_month_end() {
            assert_eq!(
                advance(dt(2024, 1, 31, 9, 0, 0), Frequency::Monthly, 1),
                Some(dt(2024, 2, 29, 9, 0, 0))
            );
            assert_eq!(
                advance(dt(2024, 2, 29, 9, 0, 0), Frequency::Yearly, 1),
                Some(dt(2025, 2, 28, 9, 0, 0))
            );
            assert_eq!(
                advance(dt(2024, 1, 1, 23, 0, 0), Frequency::Hourly, 2),
                Some(dt(2024, 1, 2, 1, 0, 0))
            );
        }

        #[test]
        fn periods_between_calendar_units() {
            let from = dt(2024, 1, 31, 9, 0, 0);
            assert_eq!(
                periods_between(from, dt(2024, 3, 1, 0, 0, 0), Frequency::Monthly, Weekday::Mon),
                2
            );
            assert_eq!(
                periods_between(from, dt(2026, 1, 1, 0, 0, 0), Frequency::Yearly, Weekday::Mon),
                2
            );
            assert_eq!(
                periods_between(from, dt(2024, 2, 5, 0, 0, 0), Frequency::Weekly, Weekday::Mon),
                1
            );
            assert_eq!(
                periods_between(from, dt(2024, 2, 1, 8, 0, 0), Frequency::Daily, Weekday::Mon),
                1
            );
            assert_eq!(
                periods_between(from, dt(2024, 2, 1, 8, 0, 0), Frequency::Hourly, Weekday::Mon),
                23
            );
        }
    }

    mod candidates {
        use super::*;

        #[test]
        fn fast_path_is_anchor() {
            let rule = RuleSpec::new(Frequency::Monthly);
            let iter = CycleIterator::new(&rule);
            let anchor = dt(2024, 1, 15, 9, 0, 0);
            assert_eq!(iter.candidates(anchor), vec![anchor]);
            let cycle = iter.next_cycle(anchor);
            assert_eq!(cycle.candidates, Some(vec![anchor]));
            assert_eq!(cycle.next_anchor, Some(dt(2024, 2, 15, 9, 0, 0)));
        }

        #[test]
        fn weekly_by_day_uses_week_window() {
            let rule = RuleSpec::new(Frequency::Weekly)
                .with_by_day([(Weekday::Mon, None), (Weekday::Wed, None)]);
            let iter = CycleIterator::new(&rule);
            // Anchor on a Wednesday still yields the whole Monday-aligned week.
            let got = iter.candidates(dt(2024, 1, 3, 10, 0, 0));
            assert_eq!(keys(&got), vec!["2024-01-01 10:00", "2024-01-03 10:00"]);
        }

        #[test]
        fn weekly_ignores_nth() {
            let rule = RuleSpec::new(Frequency::Weekly)
                .with_by_day([(Weekday::Mon, Some(2)), (Weekday::Fri, Some(-3))]);
            let iter = CycleIterator::new(&rule);
            let got = iter.candidates(dt(2024, 1, 8, 9, 0, 0));
            assert_eq!(keys(&got), vec!["2024-01-08 09:00", "2024-01-12 09:00"]);
        }

        #[test]
        fn daily_ignores_nth() {
            let rule = RuleSpec::new(Frequency::Daily).with_by_day([(Weekday::Tue, Some(1))]);
            let iter = CycleIterator::new(&rule);
            assert_eq!(keys(&iter.candidates(dt(2024, 1, 16, 9, 0, 0))), vec!["2024-01-16 09:00"]);
            assert!(iter.candidates(dt(2024, 1, 17, 9, 0, 0)).is_empty());
        }

        #[test]
        fn last_friday_of_month() {
            let rule = RuleSpec::new(Frequency::Monthly).with_by_day([(Weekday::Fri, Some(-1))]);
            let iter = CycleIterator::new(&rule);
            let got = iter.candidates(dt(2024, 5, 1, 8, 0, 0));
            assert_eq!(keys(&got), vec!["2024-05-31 08:00"]);
        }

        #[test]
        fn second_monday_of_month() {
            let rule = RuleSpec::new(Frequency::Monthly).with_by_day([(Weekday::Mon, Some(2))]);
            let iter = CycleIterator::new(&rule);
            let got = iter.candidates(dt(2024, 9, 20, 8, 0, 0));
            assert_eq!(keys(&got), vec!["2024-09-09 08:00"]);
        }

        #[test]
        fn yearly_nth_counts_in_year_without_by_month() {
            let rule = RuleSpec::new(Frequency::Yearly).with_by_day([(Weekday::Mon, Some(20))]);
            let iter = CycleIterator::new(&rule);
            let got = iter.candidates(dt(1997, 1, 1, 9, 0, 0));
            assert_eq!(keys(&got), vec!["1997-05-19 09:00"]);
        }

        #[test]
        fn yearly_nth_counts_in_month_with_by_month() {
            // Thanksgiving: 4th Thursday of November
            let rule = RuleSpec::new(Frequency::Yearly)
                .with_by_month([11])
                .with_by_day([(Weekday::Thu, Some(4))]);
            let iter = CycleIterator::new(&rule);
            let got = iter.candidates(dt(2024, 3, 1, 12, 0, 0));
            assert_eq!(keys(&got), vec!["2024-11-28 12:00"]);
        }

        #[test]
        fn negative_month_day() {
            let rule = RuleSpec::new(Frequency::Monthly).with_by_month_day(vec![-1]);
            let iter = CycleIterator::new(&rule);
            assert_eq!(keys(&iter.candidates(dt(2024, 2, 3, 0, 0, 0))), vec!["2024-02-29 00:00"]);
            assert_eq!(keys(&iter.candidates(dt(2023, 2, 3, 0, 0, 0))), vec!["2023-02-28 00:00"]);
        }

        #[test]
        fn by_year_day_both_directions() {
            let rule = RuleSpec::new(Frequency::Yearly).with_by_year_day(vec![1, -1]);
            let iter = CycleIterator::new(&rule);
            assert_eq!(
                keys(&iter.candidates(dt(2024, 6, 1, 0, 0, 0))),
                vec!["2024-01-01 00:00", "2024-12-31 00:00"]
            );
        }

        #[test]
        fn by_week_no_selects_week() {
            let rule = RuleSpec::new(Frequency::Yearly)
                .with_by_week_no(vec![20])
                .with_by_day([(Weekday::Mon, None)]);
            let iter = CycleIterator::new(&rule);
            assert_eq!(keys(&iter.candidates(dt(1997, 1, 1, 9, 0, 0))), vec!["1997-05-12 09:00"]);
        }

        #[test]
        fn by_hour_expands_for_daily() {
            let rule = RuleSpec::new(Frequency::Daily)
                .with_by_hour(vec![17, 9])
                .with_by_minute(vec![30]);
            let iter = CycleIterator::new(&rule);
            assert_eq!(
                keys(&iter.candidates(dt(2024, 1, 1, 8, 0, 0))),
                vec!["2024-01-01 09:30", "2024-01-01 17:30"]
            );
        }

        #[test]
        fn by_hour_filters_for_hourly() {
            let rule = RuleSpec::new(Frequency::Hourly).with_by_hour(vec![9, 10]);
            let iter = CycleIterator::new(&rule);
            assert_eq!(keys(&iter.candidates(dt(2024, 1, 1, 9, 15, 0))), vec!["2024-01-01 09:15"]);
            assert!(iter.candidates(dt(2024, 1, 1, 11, 15, 0)).is_empty());
        }

        #[test]
        fn set_position_applies_across_cycle() {
            // Last weekday of the month
            let rule = RuleSpec::new(Frequency::Monthly)
                .with_by_day([
                    (Weekday::Mon, None),
                    (Weekday::Tue, None),
                    (Weekday::Wed, None),
                    (Weekday::Thu, None),
                    (Weekday::Fri, None),
                ])
                .with_by_set_position(vec![-1, 1]);
            let iter = CycleIterator::new(&rule);
            assert_eq!(
                keys(&iter.candidates(dt(2024, 8, 10, 9, 0, 0))),
                vec!["2024-08-01 09:00", "2024-08-30 09:00"]
            );
        }

        #[test]
        fn inert_day_matches_nothing() {
            let rule = RuleSpec::from_json(r#"{"frequency":"weekly","byDay":[{"day":"xx"}]}"#)
                .unwrap();
            let iter = CycleIterator::new(&rule);
            let cycle = iter.next_cycle(dt(2024, 1, 1, 9, 0, 0));
            assert_eq!(cycle.candidates, None);
            // 53 weekly attempts were made.
            assert_eq!(cycle.next_anchor, Some(dt(2025, 1, 6, 9, 0, 0)));
        }

        #[test]
        fn skips_empty_months() {
            let rule = RuleSpec::new(Frequency::Monthly).with_by_month_day(vec![31]);
            let iter = CycleIterator::new(&rule);
            let cycle = iter.next_cycle(dt(2024, 2, 1, 9, 0, 0));
            assert_eq!(cycle.candidates, Some(vec![dt(2024, 3, 31, 9, 0, 0)]));
            assert_eq!(cycle.next_anchor, Some(dt(2024, 4, 1, 9, 0, 0)));
        }

        #[test]
        fn leap_day_within_yearly_ceiling() {
            let rule = RuleSpec::new(Frequency::Yearly)
                .with_by_month([2])
                .with_by_month_day(vec![29]);
            let iter = CycleIterator::new(&rule);
            let cycle = iter.next_cycle(dt(1897, 1, 1, 0, 0, 0));
            assert_eq!(cycle.candidates, Some(vec![dt(1904, 2, 29, 0, 0, 0)]));
        }
    }
}
