//! Series splitting.
//!
//! Splitting "this and following" turns one series into a predecessor
//! (same identity, occurrences before the split) and a successor (new
//! identity, occurrences from the split on). The two are linked with
//! [`Relation`] tags so a chain can be walked from any member.

use std::collections::HashSet;

use chrono::Duration;
use tracing::debug;

use crate::date_key::DateKey;
use crate::event::{EventId, RecurringEvent, Relation};
use crate::expand::OccurrenceExpander;

/// The two halves of a split series.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitOutcome {
    pub predecessor: RecurringEvent,
    pub successor: RecurringEvent,
    /// Zero-based index of the split occurrence in the original series.
    pub split_index: u32,
}

/// Splits `event` at occurrence `key`.
///
/// Returns `None` when there is nothing to split: the event has no rule,
/// `key` is not one of its rule occurrences, or `key` is the first one.
///
/// The predecessor keeps the termination style of the original rule: a
/// count becomes the split index, anything else ends at the previous
/// occurrence. The successor starts at `key` and inherits the remaining
/// count, or the original termination.
pub fn split_at(
    event: &RecurringEvent,
    key: &DateKey,
    successor_id: impl Into<EventId>,
    expander: &OccurrenceExpander,
) -> Option<SplitOutcome> {
    let rule = event.rule()?;
    let at = key.to_datetime();
    let start = event.start();
    if at <= start {
        debug!(event = %event.id(), key = %key, "Split at first occurrence is a no-op");
        return None;
    }

    let matches = expander.expand(rule, start, Some(at), Some(at + Duration::seconds(1)));
    if matches.first() != Some(&at) {
        debug!(event = %event.id(), key = %key, "Split key is not an occurrence");
        return None;
    }

    let before = expander.expand(rule, start, None, Some(at));
    let split_index = u32::try_from(before.len()).ok()?;
    let previous = *before.last()?;

    let (predecessor_rule, successor_rule) = match rule.count() {
        Some(total) => (
            rule.clone().with_count(Some(split_index)),
            rule.clone().with_count(Some(total.saturating_sub(split_index))),
        ),
        None => (rule.clone().with_until(Some(previous)), rule.clone()),
    };

    let (before_exceptions, after_exceptions) = match event.exceptions() {
        Some(exceptions) => exceptions.clone().partition_at(key),
        None => (None, None),
    };
    let (before_inclusions, after_inclusions): (Vec<_>, Vec<_>) =
        event.inclusions().iter().copied().partition(|inc| *inc < at);

    let successor_id = successor_id.into();
    let head = event
        .related_to()
        .iter()
        .find(|(_, relation)| **relation == Relation::First)
        .map_or_else(|| event.id().clone(), |(id, _)| id.clone());

    let mut predecessor_links = event.related_to().clone();
    let mut successor_links = predecessor_links.clone();
    predecessor_links.retain(|_, relation| *relation != Relation::Next);
    predecessor_links.insert(successor_id.clone(), Relation::Next);
    successor_links.retain(|_, relation| *relation == Relation::Next);
    successor_links.insert(head, Relation::First);

    let predecessor = event
        .clone()
        .with_rule(Some(predecessor_rule))
        .with_exceptions(before_exceptions)
        .with_inclusions(before_inclusions)
        .with_related_map(predecessor_links);
    let successor = event
        .clone()
        .with_id(successor_id)
        .with_start(at)
        .with_rule(Some(successor_rule))
        .with_exceptions(after_exceptions)
        .with_inclusions(after_inclusions)
        .with_related_map(successor_links);

    debug!(
        event = %event.id(),
        successor = %successor.id(),
        index = split_index,
        "Split series"
    );
    Some(SplitOutcome {
        predecessor,
        successor,
        split_index,
    })
}

/// Lists the split chain containing `id`, head first.
///
/// `lookup` resolves an id to its event; missing links end the walk.
pub fn chain<'a>(
    lookup: impl Fn(&EventId) -> Option<&'a RecurringEvent>,
    id: &EventId,
) -> Vec<EventId> {
    let Some(event) = lookup(id) else {
        return Vec::new();
    };
    let head = event
        .related_to()
        .iter()
        .find(|(_, relation)| **relation == Relation::First)
        .map_or_else(|| id.clone(), |(first, _)| first.clone());

    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(head);
    while let Some(id) = current.take() {
        if !seen.insert(id.clone()) {
            break;
        }
        current = lookup(&id).and_then(|event| {
            event
                .related_to()
                .iter()
                .find(|(_, relation)| **relation == Relation::Next)
                .map(|(next, _)| next.clone())
        });
        out.push(id);
    }
    out
}
