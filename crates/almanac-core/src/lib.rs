//! Core types: recurrence rules, expansion, exceptions, date index

pub mod calendar;
pub mod cycle;
pub mod date_key;
pub mod error;
pub mod event;
pub mod expand;
pub mod index;
pub mod occurrence;
pub mod overlay;
pub mod rule;
pub mod split;
pub mod time;
pub mod tracing;
pub mod zone;

pub use calendar::Calendar;
pub use cycle::{Cycle, CycleIterator};
pub use date_key::DateKey;
pub use error::{Error, Result};
pub use event::{EventId, Invalidation, ParticipationStatus, RecurringEvent, Relation};
pub use expand::{ExpansionConfig, OccurrenceExpander};
pub use index::{DateBucketIndex, EventSource, IndexConfig, Listing, VisibilityFilter};
pub use occurrence::{Occurrence, OccurrenceCache};
pub use overlay::{Exception, Exceptions, FieldOverride};
pub use rule::{DayCode, Frequency, RuleSpec, RuleWire};
pub use split::{SplitOutcome, chain, split_at};
pub use time::TimeWindow;
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use zone::{ViewZone, ZoneConverter};
