//! Calendar view: events and dated tasks projected into a date window

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use rusqlite::Connection;
use serde::Serialize;
use anyhow::Result;

use crate::models::{Event, Task};
use crate::recurrence::{expand_stored, Occurrence};
use crate::repo::{EventRepo, TaskRepo};
use crate::utils::{end_of_day, start_of_day};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Event,
    Task,
}

/// One row of the calendar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEntry {
    pub kind: EntryKind,
    /// Occurrence id (`parentId_instant` for repeats)
    pub id: String,
    pub parent_id: String,
    pub title: String,
    pub start: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub is_instance: bool,
}

impl From<Occurrence<Event>> for CalendarEntry {
    fn from(o: Occurrence<Event>) -> Self {
        Self {
            kind: EntryKind::Event,
            id: o.id,
            parent_id: o.parent_id,
            title: o.item.title,
            start: o.start,
            end: o.end,
            location: o.item.location,
            is_instance: o.is_instance,
        }
    }
}

impl From<Occurrence<Task>> for CalendarEntry {
    fn from(o: Occurrence<Task>) -> Self {
        Self {
            kind: EntryKind::Task,
            id: o.id,
            parent_id: o.parent_id,
            title: o.item.description,
            start: o.start,
            end: None,
            location: None,
            is_instance: o.is_instance,
        }
    }
}

/// Everything on the calendar from `from` to `to` (both inclusive),
/// ordered by start
///
/// Events are windowed on local days. Tasks are due on calendar dates, so
/// they are windowed on whole UTC days to match their midnight-UTC anchor.
/// Recurring events and recurring parent tasks are expanded; tasks spawned
/// from a parent show once on their own due date. Rows with an unusable rule
/// are left out.
pub fn entries(conn: &Connection, from: NaiveDate, to: NaiveDate, max_iterations: usize) -> Result<Vec<CalendarEntry>> {
    let event_window = (start_of_day(from)?, end_of_day(to)?);
    let task_window = (utc_day_start(from), utc_day_end(to));
    entries_in(conn, event_window, task_window, max_iterations)
}

type Window = (DateTime<FixedOffset>, DateTime<FixedOffset>);

fn utc_day_start(date: NaiveDate) -> DateTime<FixedOffset> {
    date.and_time(NaiveTime::MIN).and_utc().fixed_offset()
}

fn utc_day_end(date: NaiveDate) -> DateTime<FixedOffset> {
    let last = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    date.and_time(last).and_utc().fixed_offset()
}

fn entries_in(conn: &Connection, event_window: Window, task_window: Window, max_iterations: usize) -> Result<Vec<CalendarEntry>> {
    let mut entries: Vec<CalendarEntry> = Vec::new();

    for event in EventRepo::list_all(conn)? {
        let occurrences = expand_stored(&event, event.recurrence.as_deref(), event_window.0, event_window.1, max_iterations);
        entries.extend(occurrences.into_iter().map(CalendarEntry::from));
    }

    for task in TaskRepo::list_open_dated(conn)? {
        let rule = if task.is_recurring_parent() { task.recurrence.as_deref() } else { None };
        let occurrences = expand_stored(&task, rule, task_window.0, task_window.1, max_iterations);
        entries.extend(occurrences.into_iter().map(CalendarEntry::from));
    }

    entries.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
    Ok(entries)
}
