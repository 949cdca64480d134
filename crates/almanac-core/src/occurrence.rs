//! Occurrence views and their identity-stable cache.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::trace;

use crate::date_key::DateKey;
use crate::error::Result;
use crate::event::{EventId, Invalidation, ParticipationStatus, RecurringEvent};

/// One occurrence of an event, named by its date-key.
///
/// The view holds no attribute values: every read resolves against the
/// event it is given, override first, then the inherited value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Occurrence {
    event: EventId,
    key: DateKey,
}

impl Occurrence {
    pub fn new(event: EventId, key: DateKey) -> Self {
        Self { event, key }
    }

    pub fn event_id(&self) -> &EventId {
        &self.event
    }

    pub fn key(&self) -> &DateKey {
        &self.key
    }

    pub fn get(&self, event: &RecurringEvent, field: &str) -> Result<Value> {
        event.effective(&self.key, field)
    }

    pub fn start(&self, event: &RecurringEvent) -> NaiveDateTime {
        event.effective_start(&self.key)
    }

    pub fn end(&self, event: &RecurringEvent) -> NaiveDateTime {
        event.effective_end(&self.key)
    }

    pub fn title(&self, event: &RecurringEvent) -> Option<String> {
        event.title(&self.key)
    }

    pub fn participation_status(&self, event: &RecurringEvent) -> ParticipationStatus {
        event.participation_status(&self.key)
    }

    /// True if the occurrence has been removed.
    pub fn is_removed(&self, event: &RecurringEvent) -> bool {
        event
            .exceptions()
            .and_then(|e| e.get(&self.key))
            .is_some_and(|e| e.is_removed())
    }
}

/// Memoizes occurrence views per `(event, date-key)`.
///
/// Repeat lookups return the same `Arc` until the event's series is
/// invalidated, which drops every view of that event at once.
#[derive(Debug, Default)]
pub struct OccurrenceCache {
    entries: HashMap<EventId, HashMap<DateKey, Arc<Occurrence>>>,
}

impl OccurrenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached view, creating it on first access.
    pub fn get_or_create(&mut self, event: &EventId, key: &DateKey) -> Arc<Occurrence> {
        let per_event = self.entries.entry(event.clone()).or_default();
        Arc::clone(
            per_event
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Occurrence::new(event.clone(), key.clone()))),
        )
    }

    /// Drops every view of `event`.
    pub fn invalidate_event(&mut self, event: &EventId) {
        if let Some(dropped) = self.entries.remove(event) {
            trace!(event = %event, views = dropped.len(), "Dropped cached occurrences");
        }
    }

    /// Routes an invalidation message. Overlay-only changes keep the
    /// views: they resolve lazily and stay valid.
    pub fn apply(&mut self, invalidation: &Invalidation) {
        match invalidation {
            Invalidation::Series { event } | Invalidation::Removed { event } => {
                self.invalidate_event(event);
            }
            Invalidation::Occurrences { .. } | Invalidation::Properties { .. } => {}
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached views across all events.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
