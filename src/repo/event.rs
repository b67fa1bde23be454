use chrono::{DateTime, FixedOffset, SecondsFormat};
use rusqlite::{Connection, OptionalExtension, Row};
use crate::error::SitecalError;
use crate::models::Event;
use crate::recurrence::RecurrenceRule;
use anyhow::{Context, Result};

const EVENT_COLUMNS: &str = "id, uuid, title, location, project_id, start_at, end_at, recurrence,
                             created_ts, modified_ts";

/// Event repository for database operations
pub struct EventRepo;

impl EventRepo {
    /// Create a new event
    pub fn create_full(
        conn: &Connection,
        title: &str,
        start_at: DateTime<FixedOffset>,
        end_at: DateTime<FixedOffset>,
        location: Option<String>,
        project_id: Option<i64>,
        recurrence: Option<&RecurrenceRule>,
    ) -> Result<Event> {
        let mut event = Event::new(title.to_string(), start_at, end_at)?;
        event.location = location;
        event.project_id = project_id;
        event.recurrence = recurrence
            .map(|rule| rule.to_json().map_err(SitecalError::from))
            .transpose()?;

        conn.execute(
            "INSERT INTO events (uuid, title, location, project_id, start_at, end_at, recurrence,
                    created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                event.uuid,
                event.title,
                event.location,
                event.project_id,
                format_instant(event.start_at),
                format_instant(event.end_at),
                event.recurrence,
                event.created_ts,
                event.modified_ts
            ],
        )
        .with_context(|| format!("Failed to create event: {}", title))?;

        Ok(Event {
            id: Some(conn.last_insert_rowid()),
            ..event
        })
    }

    /// Get event by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Event>> {
        let mut stmt = conn.prepare(&format!("SELECT {} FROM events WHERE id = ?1", EVENT_COLUMNS))?;
        let event = stmt.query_row([id], row_to_event).optional()?;
        Ok(event)
    }

    /// List all events by start
    pub fn list_all(conn: &Connection) -> Result<Vec<Event>> {
        let mut stmt = conn.prepare(&format!("SELECT {} FROM events ORDER BY start_at, id", EVENT_COLUMNS))?;
        let rows = stmt.query_map([], row_to_event)?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }

    /// Delete an event and with it every occurrence of its series
    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        let deleted = conn.execute("DELETE FROM events WHERE id = ?1", [id])
            .with_context(|| format!("Failed to delete event {}", id))?;
        if deleted == 0 {
            return Err(SitecalError::EventNotFound(id).into());
        }
        Ok(())
    }
}

fn format_instant(dt: DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn parse_instant(row: &Row, idx: usize) -> rusqlite::Result<DateTime<FixedOffset>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_event(row: &Row) -> rusqlite::Result<Event> {
    Ok(Event {
        id: Some(row.get(0)?),
        uuid: row.get(1)?,
        title: row.get(2)?,
        location: row.get(3)?,
        project_id: row.get(4)?,
        start_at: parse_instant(row, 5)?,
        end_at: parse_instant(row, 6)?,
        recurrence: row.get(7)?,
        created_ts: row.get(8)?,
        modified_ts: row.get(9)?,
    })
}
