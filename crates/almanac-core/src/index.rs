//! Day-bucketed index over a sliding window.
//!
//! Two sources feed the buckets:
//! - non-recurring events, indexed once in full
//! - recurring events, expanded only within a materialized window that
//!   grows by fixed margins when a query falls outside it
//!
//! A day query merges both sources, applies the [`VisibilityFilter`] and
//! an optional caller predicate, sorts by start, and caches the result
//! (empty results included) until an [`Invalidation`] touches that day.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::date_key::DateKey;
use crate::event::{EventId, Invalidation, ParticipationStatus, RecurringEvent};
use crate::expand::OccurrenceExpander;
use crate::time::{TimeWindow, days_spanned};
use crate::zone::{MAX_ZONE_SHIFT_HOURS, ViewZone, ZoneConverter};

/// Default days materialized before a queried date.
pub const DEFAULT_MARGIN_BEFORE_DAYS: u32 = 60;

/// Default days materialized after a queried date.
pub const DEFAULT_MARGIN_AFTER_DAYS: u32 = 120;

/// Sizing of the recurring window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub margin_before_days: u32,
    pub margin_after_days: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            margin_before_days: DEFAULT_MARGIN_BEFORE_DAYS,
            margin_after_days: DEFAULT_MARGIN_AFTER_DAYS,
        }
    }
}

impl IndexConfig {
    #[must_use]
    pub fn with_margins(mut self, before_days: u32, after_days: u32) -> Self {
        self.margin_before_days = before_days;
        self.margin_after_days = after_days;
        self
    }

    fn before(&self) -> Duration {
        Duration::days(i64::from(self.margin_before_days))
    }

    fn after(&self) -> Duration {
        Duration::days(i64::from(self.margin_after_days))
    }
}

/// Which occurrences a calendar view shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityFilter {
    /// Calendars whose events are hidden.
    pub hidden_calendars: BTreeSet<String>,
    /// Show occurrences the user declined.
    pub show_declined: bool,
    pub show_all_day: bool,
    pub show_timed: bool,
}

impl Default for VisibilityFilter {
    fn default() -> Self {
        Self {
            hidden_calendars: BTreeSet::new(),
            show_declined: false,
            show_all_day: true,
            show_timed: true,
        }
    }
}

impl VisibilityFilter {
    #[must_use]
    pub fn with_hidden_calendar(mut self, calendar: impl Into<String>) -> Self {
        self.hidden_calendars.insert(calendar.into());
        self
    }

    #[must_use]
    pub fn with_show_declined(mut self, show: bool) -> Self {
        self.show_declined = show;
        self
    }

    #[must_use]
    pub fn with_show_all_day(mut self, show: bool) -> Self {
        self.show_all_day = show;
        self
    }

    #[must_use]
    pub fn with_show_timed(mut self, show: bool) -> Self {
        self.show_timed = show;
        self
    }

    /// True if occurrence `key` of `event` passes the filter.
    pub fn allows(&self, event: &RecurringEvent, key: &DateKey) -> bool {
        if (event.all_day() && !self.show_all_day) || (!event.all_day() && !self.show_timed) {
            return false;
        }
        if event
            .calendar_id(key)
            .is_some_and(|calendar| self.hidden_calendars.contains(&calendar))
        {
            return false;
        }
        self.show_declined || event.participation_status(key) != ParticipationStatus::Declined
    }
}

/// One occurrence placed in the index, in view-local time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub event: EventId,
    pub key: DateKey,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub all_day: bool,
}

/// Read access to the events an index is built from.
pub trait EventSource {
    fn event(&self, id: &EventId) -> Option<&RecurringEvent>;
    fn events(&self) -> Vec<&RecurringEvent>;
}

impl EventSource for BTreeMap<EventId, RecurringEvent> {
    fn event(&self, id: &EventId) -> Option<&RecurringEvent> {
        self.get(id)
    }

    fn events(&self) -> Vec<&RecurringEvent> {
        self.values().collect()
    }
}

/// Extra visibility check supplied by the caller.
pub type Predicate = Box<dyn Fn(&RecurringEvent, &Listing) -> bool + Send + Sync>;

type Buckets = BTreeMap<NaiveDate, Vec<Listing>>;

/// Day-bucketed occurrence index.
pub struct DateBucketIndex {
    config: IndexConfig,
    expander: OccurrenceExpander,
    filter: VisibilityFilter,
    zone: Box<dyn ZoneConverter + Send + Sync>,
    predicate: Option<Predicate>,
    fixed: Option<Buckets>,
    fixed_days: HashMap<EventId, Vec<NaiveDate>>,
    recurring: Buckets,
    placements: HashMap<EventId, HashMap<DateKey, Vec<NaiveDate>>>,
    window: Option<TimeWindow>,
    results: HashMap<NaiveDate, Vec<Listing>>,
}

impl fmt::Debug for DateBucketIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateBucketIndex")
            .field("config", &self.config)
            .field("filter", &self.filter)
            .field("window", &self.window)
            .field("recurring_days", &self.recurring.len())
            .field("cached_days", &self.results.len())
            .finish_non_exhaustive()
    }
}

impl Default for DateBucketIndex {
    fn default() -> Self {
        Self::new(IndexConfig::default(), OccurrenceExpander::default())
    }
}

impl DateBucketIndex {
    pub fn new(config: IndexConfig, expander: OccurrenceExpander) -> Self {
        Self {
            config,
            expander,
            filter: VisibilityFilter::default(),
            zone: Box::new(ViewZone::floating()),
            predicate: None,
            fixed: None,
            fixed_days: HashMap::new(),
            recurring: Buckets::new(),
            placements: HashMap::new(),
            window: None,
            results: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: VisibilityFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_zone(mut self, zone: impl ZoneConverter + Send + Sync + 'static) -> Self {
        self.zone = Box::new(zone);
        self
    }

    #[must_use]
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn filter(&self) -> &VisibilityFilter {
        &self.filter
    }

    /// The materialized recurring window, if any query has run.
    pub fn window(&self) -> Option<TimeWindow> {
        self.window
    }

    /// True if the result for `date` is cached.
    pub fn is_cached(&self, date: NaiveDate) -> bool {
        self.results.contains_key(&date)
    }

    pub fn set_filter(&mut self, filter: VisibilityFilter) {
        self.filter = filter;
        self.invalidate_all();
    }

    pub fn set_zone(&mut self, zone: impl ZoneConverter + Send + Sync + 'static) {
        self.zone = Box::new(zone);
        self.invalidate_all();
    }

    pub fn set_predicate(&mut self, predicate: Option<Predicate>) {
        self.predicate = predicate;
        self.invalidate_all();
    }

    /// Drops both source indexes and every cached result.
    pub fn invalidate_all(&mut self) {
        self.fixed = None;
        self.fixed_days.clear();
        self.recurring.clear();
        self.placements.clear();
        self.window = None;
        self.results.clear();
        trace!("Invalidated date index");
    }

    /// Routes an invalidation message. Safe to deliver more than once.
    pub fn apply<S: EventSource + ?Sized>(&mut self, source: &S, invalidation: &Invalidation) {
        match invalidation {
            Invalidation::Series { .. } | Invalidation::Removed { .. } => self.invalidate_all(),
            Invalidation::Occurrences { event, keys } => {
                let Some(found) = source.event(event) else {
                    self.invalidate_all();
                    return;
                };
                if !found.is_recurring() || self.fixed_days.contains_key(event) {
                    self.invalidate_all();
                    return;
                }
                for key in keys {
                    self.unplace(event, key);
                }
                if let Some(window) = self.window {
                    for key in keys {
                        if self.is_live(found, key) {
                            self.place(found, key, window);
                        }
                    }
                }
                trace!(event = %event, keys = keys.len(), "Re-placed occurrences");
            }
            Invalidation::Properties { event } => {
                let mut days: Vec<NaiveDate> = self
                    .placements
                    .get(event)
                    .into_iter()
                    .flat_map(|per_key| per_key.values().flatten().copied())
                    .collect();
                days.extend(self.fixed_days.get(event).into_iter().flatten().copied());
                for day in days {
                    self.results.remove(&day);
                }
            }
        }
    }

    /// Visible occurrences touching `date`, sorted by start.
    pub fn events_for_date<S: EventSource + ?Sized>(
        &mut self,
        source: &S,
        date: NaiveDate,
    ) -> Vec<Listing> {
        if let Some(cached) = self.results.get(&date) {
            return cached.clone();
        }
        self.ensure_fixed(source);
        self.ensure_window(source, date);

        let fixed = self.fixed.as_ref().and_then(|b| b.get(&date)).into_iter().flatten();
        let recurring = self.recurring.get(&date).into_iter().flatten();
        let mut listings: Vec<Listing> = fixed
            .chain(recurring)
            .filter(|listing| {
                source
                    .event(&listing.event)
                    .is_some_and(|event| self.visible(event, listing))
            })
            .cloned()
            .collect();
        sort_listings(&mut listings);

        self.results.insert(date, listings.clone());
        listings
    }

    /// Visible occurrences overlapping `window`, sorted by start.
    pub fn events_in_range<S: EventSource + ?Sized>(
        &mut self,
        source: &S,
        window: TimeWindow,
    ) -> Vec<Listing> {
        let mut seen = BTreeSet::new();
        let mut listings = Vec::new();
        for day in window.days() {
            for listing in self.events_for_date(source, day) {
                if window.overlaps(listing.start, listing.end)
                    && seen.insert((listing.event.clone(), listing.key.clone()))
                {
                    listings.push(listing);
                }
            }
        }
        sort_listings(&mut listings);
        listings
    }

    fn visible(&self, event: &RecurringEvent, listing: &Listing) -> bool {
        self.filter.allows(event, &listing.key)
            && self.predicate.as_ref().is_none_or(|p| p(event, listing))
    }

    fn is_live(&self, event: &RecurringEvent, key: &DateKey) -> bool {
        let removed = event
            .exceptions()
            .and_then(|e| e.get(key))
            .is_some_and(|e| e.is_removed());
        !removed && self.expander.is_occurrence(event, key)
    }

    fn listing(&self, event: &RecurringEvent, key: &DateKey) -> Listing {
        let local = event.effective_start(key);
        let start = if event.all_day() {
            local
        } else {
            self.zone.to_view(local, event.time_zone())
        };
        Listing {
            event: event.id().clone(),
            key: key.clone(),
            start,
            end: start
                .checked_add_signed(event.effective_duration(key))
                .unwrap_or(start),
            all_day: event.all_day(),
        }
    }

    fn ensure_fixed<S: EventSource + ?Sized>(&mut self, source: &S) {
        if self.fixed.is_some() {
            return;
        }
        let mut buckets = Buckets::new();
        for event in source.events() {
            if event.is_recurring() {
                continue;
            }
            let key = DateKey::from_datetime(event.start());
            let listing = self.listing(event, &key);
            let days = days_spanned(listing.start, listing.end);
            for day in &days {
                buckets.entry(*day).or_default().push(listing.clone());
            }
            self.fixed_days.insert(event.id().clone(), days);
        }
        debug!(days = buckets.len(), "Built fixed event index");
        self.fixed = Some(buckets);
    }

    fn ensure_window<S: EventSource + ?Sized>(&mut self, source: &S, date: NaiveDate) {
        let day = TimeWindow::for_date(date);
        let wanted = day.extend(self.config.before(), self.config.after());
        match self.window {
            Some(current) if current.covers(&day) => {}
            Some(current)
                if current
                    .extend(self.config.before(), self.config.after())
                    .overlaps(day.start, day.end) =>
            {
                let grown = current.union(&wanted);
                if grown.start < current.start {
                    self.materialize(source, TimeWindow::new(grown.start, current.start));
                }
                if grown.end > current.end {
                    self.materialize(source, TimeWindow::new(current.end, grown.end));
                }
                debug!(start = %grown.start, end = %grown.end, "Grew recurring window");
                self.window = Some(grown);
            }
            current => {
                if current.is_some() {
                    self.recurring.clear();
                    self.placements.clear();
                    self.results.clear();
                }
                self.materialize(source, wanted);
                debug!(start = %wanted.start, end = %wanted.end, "Materialized recurring window");
                self.window = Some(wanted);
            }
        }
    }

    /// Places every recurring occurrence overlapping `range`.
    fn materialize<S: EventSource + ?Sized>(&mut self, source: &S, range: TimeWindow) {
        let shift = if self.zone.shifts() {
            Duration::hours(MAX_ZONE_SHIFT_HOURS)
        } else {
            Duration::zero()
        };
        for event in source.events() {
            if !event.is_recurring() {
                continue;
            }
            let begin = range
                .start
                .checked_sub_signed(event.longest_duration() + shift)
                .unwrap_or(NaiveDateTime::MIN);
            let end = range.end.checked_add_signed(shift).unwrap_or(NaiveDateTime::MAX);
            let keys = self.expander.expand_event(event, Some(begin), Some(end));
            for key in &keys {
                self.place(event, key, range);
            }
        }
    }

    fn place(&mut self, event: &RecurringEvent, key: &DateKey, range: TimeWindow) {
        if self
            .placements
            .get(event.id())
            .is_some_and(|per_key| per_key.contains_key(key))
        {
            return;
        }
        let listing = self.listing(event, key);
        if !range.overlaps(listing.start, listing.end) {
            return;
        }
        let days = days_spanned(listing.start, listing.end);
        for day in &days {
            self.recurring.entry(*day).or_default().push(listing.clone());
            self.results.remove(day);
        }
        self.placements
            .entry(event.id().clone())
            .or_default()
            .insert(key.clone(), days);
    }

    fn unplace(&mut self, event: &EventId, key: &DateKey) {
        let Some(days) = self
            .placements
            .get_mut(event)
            .and_then(|per_key| per_key.remove(key))
        else {
            return;
        };
        for day in days {
            if let Some(bucket) = self.recurring.get_mut(&day) {
                bucket.retain(|l| !(l.event == *event && l.key == *key));
                if bucket.is_empty() {
                    self.recurring.remove(&day);
                }
            }
            self.results.remove(&day);
        }
    }
}

fn sort_listings(listings: &mut [Listing]) {
    listings.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| a.event.cmp(&b.event))
            .then_with(|| a.key.cmp(&b.key))
    });
}
