//! Single-writer owner of a calendar's events and derived state.
//!
//! Every mutation goes through [`Calendar`], which forwards the
//! [`Invalidation`] it produces to the occurrence cache and the date
//! index before returning, so readers never see a half-updated bucket.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::date_key::DateKey;
use crate::error::{Error, Result};
use crate::event::{EventId, Invalidation, RecurringEvent};
use crate::expand::{ExpansionConfig, OccurrenceExpander};
use crate::index::{DateBucketIndex, IndexConfig, Listing, VisibilityFilter};
use crate::occurrence::{Occurrence, OccurrenceCache};
use crate::split::{self, SplitOutcome};
use crate::time::TimeWindow;
use crate::zone::ViewZone;

/// Events plus their occurrence cache and date index.
#[derive(Debug, Default)]
pub struct Calendar {
    events: BTreeMap<EventId, RecurringEvent>,
    expander: OccurrenceExpander,
    cache: OccurrenceCache,
    index: DateBucketIndex,
}

impl Calendar {
    pub fn new(expansion: ExpansionConfig, index: IndexConfig) -> Self {
        let expander = OccurrenceExpander::new(expansion);
        Self {
            events: BTreeMap::new(),
            index: DateBucketIndex::new(index, expander.clone()),
            expander,
            cache: OccurrenceCache::new(),
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: impl IntoIterator<Item = RecurringEvent>) -> Self {
        for event in events {
            self.insert(event);
        }
        self
    }

    pub fn event(&self, id: &EventId) -> Option<&RecurringEvent> {
        self.events.get(id)
    }

    pub fn events(&self) -> &BTreeMap<EventId, RecurringEvent> {
        &self.events
    }

    pub fn expander(&self) -> &OccurrenceExpander {
        &self.expander
    }

    pub fn visibility(&self) -> &VisibilityFilter {
        self.index.filter()
    }

    /// Adds or replaces an event.
    pub fn insert(&mut self, event: RecurringEvent) -> Invalidation {
        let invalidation = Invalidation::Series {
            event: event.id().clone(),
        };
        self.events.insert(event.id().clone(), event);
        self.apply(&invalidation);
        invalidation
    }

    pub fn remove(&mut self, id: &EventId) -> Option<RecurringEvent> {
        let removed = self.events.remove(id)?;
        self.apply(&Invalidation::Removed { event: id.clone() });
        Some(removed)
    }

    /// Mutates one event and routes the resulting invalidation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownEvent`] if `id` is not present, or whatever
    /// the mutation returns.
    pub fn update<F>(&mut self, id: &EventId, mutate: F) -> Result<Invalidation>
    where
        F: FnOnce(&mut RecurringEvent, &OccurrenceExpander) -> Result<Invalidation>,
    {
        let event = self
            .events
            .get_mut(id)
            .ok_or_else(|| Error::unknown_event(id.as_str()))?;
        let invalidation = mutate(event, &self.expander)?;
        self.apply(&invalidation);
        Ok(invalidation)
    }

    /// Routes an invalidation to the cache and the index. Idempotent.
    pub fn apply(&mut self, invalidation: &Invalidation) {
        debug!(event = %invalidation.event(), ?invalidation, "Applying invalidation");
        self.cache.apply(invalidation);
        self.index.apply(&self.events, invalidation);
    }

    /// The cached view of occurrence `key` of event `id`.
    pub fn occurrence(&mut self, id: &EventId, key: &DateKey) -> Result<Arc<Occurrence>> {
        if !self.events.contains_key(id) {
            return Err(Error::unknown_event(id.as_str()));
        }
        Ok(self.cache.get_or_create(id, key))
    }

    /// Date-keys of event `id` whose effective start falls in `window`.
    pub fn occurrences(&self, id: &EventId, window: TimeWindow) -> Result<Vec<DateKey>> {
        let event = self
            .events
            .get(id)
            .ok_or_else(|| Error::unknown_event(id.as_str()))?;
        Ok(self
            .expander
            .expand_event(event, Some(window.start), Some(window.end)))
    }

    pub fn events_for_date(&mut self, date: NaiveDate) -> Vec<Listing> {
        self.index.events_for_date(&self.events, date)
    }

    pub fn events_in_range(&mut self, window: TimeWindow) -> Vec<Listing> {
        self.index.events_in_range(&self.events, window)
    }

    /// Splits event `id` at `key`, storing both halves.
    ///
    /// Returns `Ok(None)` when the split is a no-op.
    pub fn split(
        &mut self,
        id: &EventId,
        key: &DateKey,
        successor_id: impl Into<EventId>,
    ) -> Result<Option<SplitOutcome>> {
        let event = self
            .events
            .get(id)
            .ok_or_else(|| Error::unknown_event(id.as_str()))?;
        let Some(outcome) = split::split_at(event, key, successor_id, &self.expander) else {
            return Ok(None);
        };
        self.insert(outcome.predecessor.clone());
        self.insert(outcome.successor.clone());
        Ok(Some(outcome))
    }

    /// The split chain containing `id`, head first.
    pub fn chain(&self, id: &EventId) -> Vec<EventId> {
        split::chain(|id| self.events.get(id), id)
    }

    pub fn set_visibility(&mut self, filter: VisibilityFilter) {
        self.index.set_filter(filter);
    }

    pub fn set_view_zone(&mut self, zone: ViewZone) {
        self.index.set_zone(zone);
    }

    /// Number of cached occurrence views.
    pub fn cached_occurrences(&self) -> usize {
        self.cache.len()
    }
}
