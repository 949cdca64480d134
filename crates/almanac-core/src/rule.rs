//! Recurrence rules.
//!
//! This module provides the canonical, immutable [`RuleSpec`] and its JSON
//! wire form [`RuleWire`]:
//! - [`Frequency`]: the natural period of one recurrence cycle
//! - [`DayCode`]: a `byDay` selector collapsed to `weekday + 7 * nth`
//! - [`RuleSpec`]: parsed, defaulted rule; edits rebuild it via `with_*`
//!
//! Parsing never fails on content. Unknown frequencies become daily, bad
//! week starts become Monday, intervals below one become one and unknown
//! day tokens are kept but never match.

use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::date_key::{DateKey, parse_local};
use crate::error::Result;

/// How often a rule recurs.
///
/// Variants are ordered from coarsest to finest, so `a < b` means `a`
/// has the longer period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Yearly,
    Monthly,
    Weekly,
    Daily,
    Hourly,
    Minutely,
    Secondly,
}

impl Frequency {
    /// Parses a frequency name, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "yearly" => Some(Self::Yearly),
            "monthly" => Some(Self::Monthly),
            "weekly" => Some(Self::Weekly),
            "daily" => Some(Self::Daily),
            "hourly" => Some(Self::Hourly),
            "minutely" => Some(Self::Minutely),
            "secondly" => Some(Self::Secondly),
            _ => None,
        }
    }

    /// Returns the canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yearly => "yearly",
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
            Self::Daily => "daily",
            Self::Hourly => "hourly",
            Self::Minutely => "minutely",
            Self::Secondly => "secondly",
        }
    }

    /// Maximum number of consecutive empty cycles tried before giving up.
    ///
    /// Large enough to cross the worst calendar gap for each period, e.g.
    /// eight years between two February 29ths.
    pub fn attempt_ceiling(&self) -> u32 {
        match self {
            Self::Yearly => 10,
            Self::Monthly => 24,
            Self::Weekly => 53,
            Self::Daily => 366,
            Self::Hourly => 48,
            Self::Minutely | Self::Secondly => 120,
        }
    }
}

/// Parses a weekday token (`"mo"`, `"monday"`, any case).
pub fn parse_weekday(value: &str) -> Option<Weekday> {
    match value.to_ascii_lowercase().as_str() {
        "mo" | "monday" => Some(Weekday::Mon),
        "tu" | "tuesday" => Some(Weekday::Tue),
        "we" | "wednesday" => Some(Weekday::Wed),
        "th" | "thursday" => Some(Weekday::Thu),
        "fr" | "friday" => Some(Weekday::Fri),
        "sa" | "saturday" => Some(Weekday::Sat),
        "su" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Returns the canonical wire name of a weekday.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// A `byDay` selector.
///
/// Known selectors collapse `(weekday, nth)` into one signed integer,
/// `weekday + 7 * nth` with Sunday as 0, so matching a candidate is a set
/// lookup. `nth == 0` means "every such weekday in the period".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DayCode {
    /// A recognised weekday with optional position.
    Code(i32),
    /// An unrecognised day token, retained verbatim; it matches nothing.
    Inert { day: String, nth: Option<i32> },
}

impl DayCode {
    /// Builds the code for a weekday and optional nth-of-period.
    pub fn new(day: Weekday, nth: Option<i32>) -> Self {
        Self::Code(encode_day(day, nth.unwrap_or(0)))
    }

    /// Returns the weekday, if recognised.
    pub fn weekday(&self) -> Option<Weekday> {
        match self {
            Self::Code(code) => Some(weekday_from_index(code.rem_euclid(7))),
            Self::Inert { .. } => None,
        }
    }

    /// Returns the nth-of-period, `None` meaning every occurrence.
    pub fn nth(&self) -> Option<i32> {
        match self {
            Self::Code(code) => Some(code.div_euclid(7)).filter(|n| *n != 0),
            Self::Inert { nth, .. } => *nth,
        }
    }

    /// Returns the collapsed code, or `None` for inert selectors.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Code(code) => Some(*code),
            Self::Inert { .. } => None,
        }
    }
}

/// Collapses a weekday and position into a single code.
pub fn encode_day(day: Weekday, nth: i32) -> i32 {
    day.num_days_from_sunday() as i32 + 7 * nth
}

fn weekday_from_index(index: i32) -> Weekday {
    match index {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

/// Wire form of a `byDay` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NDayWire {
    pub day: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nth_of_period: Option<i32>,
}

/// JSON wire form of a recurrence rule.
///
/// Every field is optional so partial input still parses; the canonical
/// defaults are applied by [`RuleSpec::parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_day_of_week: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_day: Option<Vec<NDayWire>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_month_day: Option<Vec<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_month: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_year_day: Option<Vec<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_week_no: Option<Vec<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_hour: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_minute: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_second: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_set_position: Option<Vec<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

/// A canonical recurrence rule.
///
/// Empty `by_*` lists mean "no restriction". `by_month` is zero-based.
/// The value is never edited in place: the `with_*` builders consume the
/// rule and return a replacement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RuleWire", into = "RuleWire")]
pub struct RuleSpec {
    frequency: Frequency,
    interval: u32,
    first_day_of_week: Weekday,
    by_day: Vec<DayCode>,
    by_month_day: Vec<i32>,
    by_month: Vec<i32>,
    by_year_day: Vec<i32>,
    by_week_no: Vec<i32>,
    by_hour: Vec<u32>,
    by_minute: Vec<u32>,
    by_second: Vec<u32>,
    by_set_position: Vec<i32>,
    until: Option<NaiveDateTime>,
    count: Option<u32>,
}

impl RuleSpec {
    /// Creates an unrestricted rule with the given frequency.
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            first_day_of_week: Weekday::Mon,
            by_day: Vec::new(),
            by_month_day: Vec::new(),
            by_month: Vec::new(),
            by_year_day: Vec::new(),
            by_week_no: Vec::new(),
            by_hour: Vec::new(),
            by_minute: Vec::new(),
            by_second: Vec::new(),
            by_set_position: Vec::new(),
            until: None,
            count: None,
        }
    }

    /// Canonicalises a wire rule, applying defaults.
    pub fn parse(wire: &RuleWire) -> Self {
        let frequency = match wire.frequency.as_deref() {
            Some(name) => Frequency::parse(name).unwrap_or_else(|| {
                warn!(frequency = %name, "Unknown rule frequency, using daily");
                Frequency::Daily
            }),
            None => Frequency::Daily,
        };

        let first_day_of_week = wire
            .first_day_of_week
            .as_deref()
            .and_then(parse_weekday)
            .unwrap_or(Weekday::Mon);

        let by_day = wire
            .by_day
            .iter()
            .flatten()
            .map(|entry| match parse_weekday(&entry.day) {
                Some(day) => DayCode::new(day, entry.nth_of_period),
                None => {
                    warn!(day = %entry.day, "Unrecognised byDay token will never match");
                    DayCode::Inert {
                        day: entry.day.clone(),
                        nth: entry.nth_of_period,
                    }
                }
            })
            .collect();

        let by_month = wire
            .by_month
            .iter()
            .flatten()
            .filter_map(|month| match month.trim().parse::<i32>() {
                Ok(value) => Some(value - 1),
                Err(_) => {
                    warn!(month = %month, "Ignoring non-numeric byMonth value");
                    None
                }
            })
            .collect();

        let until = wire.until.as_deref().and_then(|raw| {
            let parsed = parse_until(raw);
            if parsed.is_none() {
                warn!(until = %raw, "Ignoring unparseable until");
            }
            parsed
        });

        Self {
            frequency,
            interval: wire
                .interval
                .map_or(1, |value| u32::try_from(value.max(1)).unwrap_or(u32::MAX)),
            first_day_of_week,
            by_day,
            by_month_day: wire.by_month_day.clone().unwrap_or_default(),
            by_month,
            by_year_day: wire.by_year_day.clone().unwrap_or_default(),
            by_week_no: wire.by_week_no.clone().unwrap_or_default(),
            by_hour: wire.by_hour.clone().unwrap_or_default(),
            by_minute: wire.by_minute.clone().unwrap_or_default(),
            by_second: wire.by_second.clone().unwrap_or_default(),
            by_set_position: wire.by_set_position.clone().unwrap_or_default(),
            until,
            count: wire.count,
        }
    }

    /// Parses a rule from JSON.
    ///
    /// # Errors
    ///
    /// Fails only when the input is not JSON of the wire shape.
    pub fn from_json(json: &str) -> Result<Self> {
        let wire: RuleWire = serde_json::from_str(json)?;
        Ok(Self::parse(&wire))
    }

    /// Produces the canonical wire form.
    ///
    /// `interval == 1` and a Monday week start are omitted.
    pub fn to_wire(&self) -> RuleWire {
        fn list<T: Clone>(values: &[T]) -> Option<Vec<T>> {
            (!values.is_empty()).then(|| values.to_vec())
        }

        let by_day = self
            .by_day
            .iter()
            .map(|code| match code {
                DayCode::Code(_) => NDayWire {
                    day: code.weekday().map(weekday_name).unwrap_or_default().to_string(),
                    nth_of_period: code.nth(),
                },
                DayCode::Inert { day, nth } => NDayWire {
                    day: day.clone(),
                    nth_of_period: *nth,
                },
            })
            .collect::<Vec<_>>();

        RuleWire {
            frequency: Some(self.frequency.as_str().to_string()),
            interval: (self.interval != 1).then_some(i64::from(self.interval)),
            first_day_of_week: (self.first_day_of_week != Weekday::Mon)
                .then(|| weekday_name(self.first_day_of_week).to_string()),
            by_day: list(&by_day),
            by_month_day: list(&self.by_month_day),
            by_month: list(
                &self
                    .by_month
                    .iter()
                    .map(|month| (month + 1).to_string())
                    .collect::<Vec<_>>(),
            ),
            by_year_day: list(&self.by_year_day),
            by_week_no: list(&self.by_week_no),
            by_hour: list(&self.by_hour),
            by_minute: list(&self.by_minute),
            by_second: list(&self.by_second),
            by_set_position: list(&self.by_set_position),
            until: self
                .until
                .map(|until| DateKey::from_datetime(until).to_string()),
            count: self.count,
        }
    }

    /// Serializes the canonical wire form to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_wire())?)
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn first_day_of_week(&self) -> Weekday {
        self.first_day_of_week
    }

    pub fn by_day(&self) -> &[DayCode] {
        &self.by_day
    }

    pub fn by_month_day(&self) -> &[i32] {
        &self.by_month_day
    }

    /// Zero-based months.
    pub fn by_month(&self) -> &[i32] {
        &self.by_month
    }

    pub fn by_year_day(&self) -> &[i32] {
        &self.by_year_day
    }

    pub fn by_week_no(&self) -> &[i32] {
        &self.by_week_no
    }

    pub fn by_hour(&self) -> &[u32] {
        &self.by_hour
    }

    pub fn by_minute(&self) -> &[u32] {
        &self.by_minute
    }

    pub fn by_second(&self) -> &[u32] {
        &self.by_second
    }

    pub fn by_set_position(&self) -> &[i32] {
        &self.by_set_position
    }

    pub fn until(&self) -> Option<NaiveDateTime> {
        self.until
    }

    pub fn count(&self) -> Option<u32> {
        self.count
    }

    /// Returns true if any `by_*` part is present.
    pub fn has_restrictions(&self) -> bool {
        !(self.by_day.is_empty()
            && self.by_month_day.is_empty()
            && self.by_month.is_empty()
            && self.by_year_day.is_empty()
            && self.by_week_no.is_empty()
            && self.by_hour.is_empty()
            && self.by_minute.is_empty()
            && self.by_second.is_empty()
            && self.by_set_position.is_empty())
    }

    /// Returns true if neither `count` nor `until` bounds the series.
    pub fn is_unbounded(&self) -> bool {
        self.count.is_none() && self.until.is_none()
    }

    /// Builder: set interval (values below one become one).
    #[must_use]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Builder: set the first day of the week.
    #[must_use]
    pub fn with_first_day_of_week(mut self, day: Weekday) -> Self {
        self.first_day_of_week = day;
        self
    }

    /// Builder: set `byDay` from `(weekday, nth)` pairs.
    #[must_use]
    pub fn with_by_day(mut self, days: impl IntoIterator<Item = (Weekday, Option<i32>)>) -> Self {
        self.by_day = days
            .into_iter()
            .map(|(day, nth)| DayCode::new(day, nth))
            .collect();
        self
    }

    /// Builder: set `byDay` from already-built selectors.
    #[must_use]
    pub fn with_day_codes(mut self, codes: Vec<DayCode>) -> Self {
        self.by_day = codes;
        self
    }

    #[must_use]
    pub fn with_by_month_day(mut self, days: Vec<i32>) -> Self {
        self.by_month_day = days;
        self
    }

    /// Builder: set `byMonth` from one-based months.
    #[must_use]
    pub fn with_by_month(mut self, months: impl IntoIterator<Item = i32>) -> Self {
        self.by_month = months.into_iter().map(|month| month - 1).collect();
        self
    }

    #[must_use]
    pub fn with_by_year_day(mut self, days: Vec<i32>) -> Self {
        self.by_year_day = days;
        self
    }

    #[must_use]
    pub fn with_by_week_no(mut self, weeks: Vec<i32>) -> Self {
        self.by_week_no = weeks;
        self
    }

    #[must_use]
    pub fn with_by_hour(mut self, hours: Vec<u32>) -> Self {
        self.by_hour = hours;
        self
    }

    #[must_use]
    pub fn with_by_minute(mut self, minutes: Vec<u32>) -> Self {
        self.by_minute = minutes;
        self
    }

    #[must_use]
    pub fn with_by_second(mut self, seconds: Vec<u32>) -> Self {
        self.by_second = seconds;
        self
    }

    #[must_use]
    pub fn with_by_set_position(mut self, positions: Vec<i32>) -> Self {
        self.by_set_position = positions;
        self
    }

    #[must_use]
    pub fn with_until(mut self, until: Option<NaiveDateTime>) -> Self {
        self.until = until;
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: Option<u32>) -> Self {
        self.count = count;
        self
    }
}

impl From<RuleWire> for RuleSpec {
    fn from(wire: RuleWire) -> Self {
        Self::parse(&wire)
    }
}

impl From<RuleSpec> for RuleWire {
    fn from(rule: RuleSpec) -> Self {
        rule.to_wire()
    }
}

/// Accepts a date-key, a trailing `Z`, or a bare date (midnight).
fn parse_until(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim().trim_end_matches('Z');
    parse_local(trimmed).ok().or_else(|| {
        chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    })
}
