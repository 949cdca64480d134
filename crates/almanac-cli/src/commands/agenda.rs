//! `almanac agenda`: per-day listings for a set of events.

use std::fmt::Write as _;
use std::path::Path;

use almanac_core::time::day_start;
use almanac_core::{Calendar, DateKey, EventId, Listing, RecurringEvent};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// One day of an agenda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgendaDay {
    pub date: NaiveDate,
    pub entries: Vec<AgendaEntry>,
}

/// One listed occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaEntry {
    pub event: EventId,
    pub key: DateKey,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub all_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Loads events from `path` and prints `days` days starting at `date`.
pub fn run(
    config: &CliConfig,
    events: &Path,
    date: NaiveDate,
    days: u32,
    json: bool,
) -> CliResult<()> {
    let events = load_events(events)?;
    let agenda = build(config, events, date, days)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&agenda)?);
    } else {
        print!("{}", render(&agenda));
    }
    Ok(())
}

/// Reads a JSON array of events.
pub fn load_events(path: &Path) -> CliResult<Vec<RecurringEvent>> {
    let content = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    let events: Vec<RecurringEvent> = serde_json::from_str(&content)?;
    debug!(path = %path.display(), events = events.len(), "Loaded events");
    Ok(events)
}

/// Builds the agenda for `days` consecutive days from `date`.
pub fn build(
    config: &CliConfig,
    events: Vec<RecurringEvent>,
    date: NaiveDate,
    days: u32,
) -> CliResult<Vec<AgendaDay>> {
    let mut calendar = config.calendar()?.with_events(events);
    let agenda = date
        .iter_days()
        .take(days as usize)
        .map(|day| AgendaDay {
            date: day,
            entries: calendar
                .events_for_date(day)
                .iter()
                .map(|listing| entry(&calendar, listing))
                .collect(),
        })
        .collect();
    Ok(agenda)
}

fn entry(calendar: &Calendar, listing: &Listing) -> AgendaEntry {
    AgendaEntry {
        event: listing.event.clone(),
        key: listing.key.clone(),
        start: listing.start,
        end: listing.end,
        all_day: listing.all_day,
        title: calendar
            .event(&listing.event)
            .and_then(|event| event.title(&listing.key)),
    }
}

/// Plain-text rendering: a header per day, one line per entry.
pub fn render(agenda: &[AgendaDay]) -> String {
    let mut out = String::new();
    for day in agenda {
        let _ = writeln!(out, "{}", day.date.format("%Y-%m-%d %a"));
        if day.entries.is_empty() {
            let _ = writeln!(out, "  (no events)");
        }
        for entry in &day.entries {
            let title = entry.title.as_deref().unwrap_or(entry.event.as_str());
            let _ = writeln!(out, "  {:<12} {}", time_span(day.date, entry), title);
        }
    }
    out
}

fn time_span(date: NaiveDate, entry: &AgendaEntry) -> String {
    if entry.all_day {
        return "all day".to_string();
    }
    let start = if entry.start < day_start(date) {
        "..".to_string()
    } else {
        entry.start.format("%H:%M").to_string()
    };
    let end = match date.succ_opt() {
        Some(next) if entry.end > day_start(next) => "..".to_string(),
        _ => entry.end.format("%H:%M").to_string(),
    };
    format!("{start}-{end}")
}
