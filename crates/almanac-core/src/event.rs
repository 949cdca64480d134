//! Recurring event model.
//!
//! This module provides the mutable series record and the messages its
//! mutations emit:
//! - [`RecurringEvent`]: start, duration, optional rule, inclusions,
//!   exceptions and a free-form property map
//! - [`EventId`]: the identity of an event
//! - [`Relation`]: how split events in a chain refer to each other
//! - [`Invalidation`]: what a mutation invalidated, for caches and indexes
//! - [`ParticipationStatus`]: the user's response to an event

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::date_key::{DateKey, parse_local};
use crate::error::{Error, Result};
use crate::expand::OccurrenceExpander;
use crate::overlay::{self, DURATION_FIELD, Exceptions, START_FIELD};
use crate::rule::RuleSpec;

/// Property holding the calendar an event belongs to.
pub const CALENDAR_ID_PROPERTY: &str = "calendarId";

/// Property holding the user's participation status.
pub const PARTICIPATION_PROPERTY: &str = "participationStatus";

/// Property holding the event title.
pub const TITLE_PROPERTY: &str = "title";

/// Longest duration an event or occurrence may have.
pub const MAX_DURATION_DAYS: i64 = 3660;

/// Clamps `duration` into `0..=MAX_DURATION_DAYS` days.
pub fn clamp_duration(duration: Duration) -> Duration {
    duration.clamp(Duration::zero(), Duration::days(MAX_DURATION_DAYS))
}

/// Identity of an event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Link between events of a split chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    /// The related event is the head of the chain.
    First,
    /// The related event continues this one.
    Next,
}

/// The response status of the user for an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParticipationStatus {
    /// The user has accepted the invitation.
    Accepted,
    /// The user has declined the invitation.
    Declined,
    /// The user has tentatively accepted.
    Tentative,
    /// The user has not responded.
    NeedsAction,
    /// No status, or one that is not recognized.
    #[default]
    Unknown,
}

impl ParticipationStatus {
    /// Reads a status from a property value.
    pub fn from_value(value: &Value) -> Self {
        match value.as_str() {
            Some("accepted") => Self::Accepted,
            Some("declined") => Self::Declined,
            Some("tentative") => Self::Tentative,
            Some("needs-action") => Self::NeedsAction,
            _ => Self::Unknown,
        }
    }
}

/// What a mutation of an event invalidated.
///
/// Handlers must be idempotent: receiving the same message twice is
/// harmless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    /// Start, time zone, duration or rule changed: every derived value of
    /// the event is stale.
    Series { event: EventId },
    /// Only the listed occurrences changed.
    Occurrences { event: EventId, keys: Vec<DateKey> },
    /// A series-level property changed; placements are still valid.
    Properties { event: EventId },
    /// The event is gone.
    Removed { event: EventId },
}

impl Invalidation {
    pub fn event(&self) -> &EventId {
        match self {
            Self::Series { event }
            | Self::Occurrences { event, .. }
            | Self::Properties { event }
            | Self::Removed { event } => event,
        }
    }
}

/// A possibly recurring calendar event.
///
/// All times are local to `time_zone` (floating when `None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringEvent {
    id: EventId,
    start: NaiveDateTime,
    #[serde(default = "Duration::zero", with = "duration_seconds")]
    duration: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
    #[serde(default)]
    all_day: bool,
    #[serde(default, rename = "recurrenceRule", skip_serializing_if = "Option::is_none")]
    rule: Option<RuleSpec>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    inclusions: BTreeSet<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exceptions: Option<Exceptions>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    related_to: BTreeMap<EventId, Relation>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    properties: Map<String, Value>,
}

impl RecurringEvent {
    /// Creates a zero-length, non-recurring event.
    pub fn new(id: impl Into<EventId>, start: NaiveDateTime) -> Self {
        Self {
            id: id.into(),
            start,
            duration: Duration::zero(),
            time_zone: None,
            all_day: false,
            rule: None,
            inclusions: BTreeSet::new(),
            exceptions: None,
            related_to: BTreeMap::new(),
            properties: Map::new(),
        }
    }

    /// Parses an event from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<EventId>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_start(mut self, start: NaiveDateTime) -> Self {
        self.start = start;
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = clamp_duration(duration);
        self
    }

    #[must_use]
    pub fn with_time_zone(mut self, zone: impl Into<String>) -> Self {
        self.time_zone = Some(zone.into());
        self
    }

    #[must_use]
    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: Option<RuleSpec>) -> Self {
        self.rule = rule;
        self
    }

    #[must_use]
    pub fn with_inclusions(mut self, inclusions: impl IntoIterator<Item = NaiveDateTime>) -> Self {
        self.inclusions = inclusions.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_exceptions(mut self, exceptions: Option<Exceptions>) -> Self {
        self.exceptions = exceptions.filter(|e| !e.is_empty());
        self
    }

    #[must_use]
    pub fn with_related(mut self, id: impl Into<EventId>, relation: Relation) -> Self {
        self.related_to.insert(id.into(), relation);
        self
    }

    #[must_use]
    pub fn with_related_map(mut self, related: BTreeMap<EventId, Relation>) -> Self {
        self.related_to = related;
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    pub fn id(&self) -> &EventId {
        &self.id
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn time_zone(&self) -> Option<&str> {
        self.time_zone.as_deref()
    }

    pub fn all_day(&self) -> bool {
        self.all_day
    }

    pub fn rule(&self) -> Option<&RuleSpec> {
        self.rule.as_ref()
    }

    pub fn inclusions(&self) -> &BTreeSet<NaiveDateTime> {
        &self.inclusions
    }

    pub fn exceptions(&self) -> Option<&Exceptions> {
        self.exceptions.as_ref()
    }

    pub fn related_to(&self) -> &BTreeMap<EventId, Relation> {
        &self.related_to
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// True if the event has more than one potential occurrence.
    pub fn is_recurring(&self) -> bool {
        self.rule.is_some() || !self.inclusions.is_empty()
    }

    /// The value occurrence `key` sees for `field` without an override.
    ///
    /// The start is pinned to the occurrence's own key rather than the
    /// series start.
    pub fn inherited(&self, key: &DateKey, field: &str) -> Value {
        match field {
            START_FIELD => Value::String(key.as_str().to_string()),
            DURATION_FIELD => Value::from(self.duration.num_seconds()),
            _ => self.properties.get(field).cloned().unwrap_or(Value::Null),
        }
    }

    /// Resolves `field` for occurrence `key`.
    pub fn effective(&self, key: &DateKey, field: &str) -> Result<Value> {
        overlay::effective(
            self.exceptions.as_ref(),
            key,
            field,
            &self.inherited(key, field),
        )
    }

    /// The start of occurrence `key`, honouring a start override.
    pub fn effective_start(&self, key: &DateKey) -> NaiveDateTime {
        self.effective(key, START_FIELD)
            .ok()
            .and_then(|v| v.as_str().and_then(|s| parse_local(s).ok()))
            .unwrap_or_else(|| key.to_datetime())
    }

    /// The duration of occurrence `key`, honouring a duration override.
    pub fn effective_duration(&self, key: &DateKey) -> Duration {
        self.effective(key, DURATION_FIELD)
            .ok()
            .and_then(|v| v.as_i64())
            .and_then(Duration::try_seconds)
            .map_or(self.duration, clamp_duration)
    }

    /// The end of occurrence `key`. An end past the representable range
    /// collapses to the start.
    pub fn effective_end(&self, key: &DateKey) -> NaiveDateTime {
        let start = self.effective_start(key);
        start
            .checked_add_signed(self.effective_duration(key))
            .unwrap_or(start)
    }

    /// The series duration or the longest per-occurrence override,
    /// whichever is greater.
    pub fn longest_duration(&self) -> Duration {
        self.exceptions
            .iter()
            .flat_map(|exceptions| exceptions.keys())
            .map(|key| self.effective_duration(key))
            .fold(self.duration, std::cmp::max)
    }

    pub fn title(&self, key: &DateKey) -> Option<String> {
        self.effective_str(key, TITLE_PROPERTY)
    }

    pub fn calendar_id(&self, key: &DateKey) -> Option<String> {
        self.effective_str(key, CALENDAR_ID_PROPERTY)
    }

    pub fn participation_status(&self, key: &DateKey) -> ParticipationStatus {
        self.effective(key, PARTICIPATION_PROPERTY)
            .map(|v| ParticipationStatus::from_value(&v))
            .unwrap_or_default()
    }

    fn effective_str(&self, key: &DateKey, field: &str) -> Option<String> {
        self.effective(key, field)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
    }

    /// Moves the series start. Exceptions and inclusions move with it, so
    /// every override stays attached to the same occurrence.
    pub fn set_start(&mut self, start: NaiveDateTime) -> Result<Invalidation> {
        let delta = start - self.start;
        self.start = start;
        if delta != Duration::zero() {
            self.inclusions = self.inclusions.iter().map(|at| *at + delta).collect();
            self.exceptions = self
                .exceptions
                .take()
                .map(|e| e.rekey(|key| DateKey::from_datetime(key.to_datetime() + delta)));
        }
        self.prune()?;
        Ok(self.series_changed())
    }

    /// Replaces the rule. Exceptions for keys that are no longer
    /// occurrences are dropped.
    pub fn set_rule(
        &mut self,
        rule: Option<RuleSpec>,
        expander: &OccurrenceExpander,
    ) -> Invalidation {
        self.rule = rule;
        if let Some(mut exceptions) = self.exceptions.take() {
            exceptions.retain(|key, _| expander.is_occurrence(self, key));
            self.exceptions = (!exceptions.is_empty()).then_some(exceptions);
        }
        self.series_changed()
    }

    pub fn set_time_zone(&mut self, zone: Option<String>) -> Invalidation {
        self.time_zone = zone;
        self.series_changed()
    }

    /// Sets the series duration, clamped to [`MAX_DURATION_DAYS`].
    pub fn set_duration(&mut self, duration: Duration) -> Result<Invalidation> {
        let previous = std::mem::replace(&mut self.duration, clamp_duration(duration));
        if let Err(err) = self.prune() {
            self.duration = previous;
            return Err(err);
        }
        Ok(self.series_changed())
    }

    pub fn set_all_day(&mut self, all_day: bool) -> Invalidation {
        self.all_day = all_day;
        self.series_changed()
    }

    /// Sets a series-level property and drops occurrence overrides that
    /// now match it. Nothing changes if a stored diff no longer fits.
    pub fn set_property(&mut self, name: &str, value: Value) -> Result<Invalidation> {
        let previous = self.properties.insert(name.to_string(), value);
        if let Err(err) = self.prune() {
            match previous {
                Some(previous) => self.properties.insert(name.to_string(), previous),
                None => self.properties.remove(name),
            };
            return Err(err);
        }
        Ok(Invalidation::Properties {
            event: self.id.clone(),
        })
    }

    /// Overrides `field` on occurrence `key`.
    ///
    /// # Errors
    ///
    /// A start override must be a date-key string.
    pub fn set_occurrence_field(
        &mut self,
        key: &DateKey,
        field: &str,
        value: Value,
    ) -> Result<Invalidation> {
        if field == START_FIELD {
            let raw = value.as_str().unwrap_or_default();
            DateKey::parse(raw).map_err(|_| Error::invalid_date_key(value.to_string()))?;
        }
        let inherited = self.inherited(key, field);
        overlay::apply(&mut self.exceptions, key, field, &inherited, &value);
        self.prune()?;
        Ok(self.occurrence_changed(key))
    }

    /// Marks occurrence `key` as not happening.
    pub fn remove_occurrence(&mut self, key: &DateKey) -> Invalidation {
        overlay::remove(&mut self.exceptions, key);
        self.occurrence_changed(key)
    }

    /// Drops every override of occurrence `key`, tombstone included.
    pub fn restore_occurrence(&mut self, key: &DateKey) -> Invalidation {
        overlay::restore(&mut self.exceptions, key);
        self.occurrence_changed(key)
    }

    pub fn add_inclusion(&mut self, at: NaiveDateTime) -> Invalidation {
        self.inclusions.insert(at);
        self.occurrence_changed(&DateKey::from_datetime(at))
    }

    pub fn remove_inclusion(&mut self, at: NaiveDateTime) -> Invalidation {
        self.inclusions.remove(&at);
        self.occurrence_changed(&DateKey::from_datetime(at))
    }

    fn prune(&mut self) -> Result<()> {
        let mut exceptions = self.exceptions.take();
        let result = overlay::prune(&mut exceptions, |key, field| self.inherited(key, field));
        self.exceptions = exceptions;
        result
    }

    fn series_changed(&self) -> Invalidation {
        Invalidation::Series {
            event: self.id.clone(),
        }
    }

    fn occurrence_changed(&self, key: &DateKey) -> Invalidation {
        Invalidation::Occurrences {
            event: self.id.clone(),
            keys: vec![key.clone()],
        }
    }
}

mod duration_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::MAX_DURATION_DAYS;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let seconds = i64::deserialize(deserializer)?;
        Duration::try_seconds(seconds)
            .filter(|d| *d >= Duration::zero() && *d <= Duration::days(MAX_DURATION_DAYS))
            .ok_or_else(|| serde::de::Error::custom(format!("duration out of range: {seconds}")))
    }
}
