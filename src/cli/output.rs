// Table formatting for command output

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Local, NaiveDate};

use crate::calendar::{CalendarEntry, EntryKind};
use crate::models::{Event, Project, Task, TaskStatus};
use crate::recurrence::{summary, RecurrenceRule};

/// Project names keyed by id, for resolving `project_id` columns
pub type ProjectNames = HashMap<i64, String>;

pub fn project_names(projects: &[Project]) -> ProjectNames {
    projects
        .iter()
        .filter_map(|p| p.id.map(|id| (id, p.name.clone())))
        .collect()
}

fn project_label(names: &ProjectNames, project_id: Option<i64>) -> String {
    match project_id {
        Some(id) => names.get(&id).cloned().unwrap_or_else(|| format!("[{}]", id)),
        None => String::new(),
    }
}

/// Rule summary for a table cell; unusable rules are flagged, not hidden
pub fn format_recurrence(stored: Option<&str>) -> String {
    match stored.filter(|s| !s.trim().is_empty()) {
        None => String::new(),
        Some(json) => match RecurrenceRule::from_json(json) {
            Ok(rule) => summary(&rule),
            Err(_) => "(invalid rule)".to_string(),
        },
    }
}

/// Due date relative to today ("today", "tomorrow", "in 3 days", "2 days ago")
pub fn format_relative_date(date: NaiveDate, today: NaiveDate) -> String {
    let days = (date - today).num_days();
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        d if d > 1 && d <= 365 => format!("in {} days", d),
        d if d < -1 && d >= -30 => format!("{} days ago", -d),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}

/// Instant in the local timezone
pub fn format_local(dt: DateTime<FixedOffset>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Format task list as a table
pub fn format_task_list_table(tasks: &[Task], names: &ProjectNames, today: NaiveDate, relative: bool) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }

    let rows: Vec<[String; 6]> = tasks
        .iter()
        .map(|task| {
            let due = match task.due_date {
                Some(d) if relative => format_relative_date(d, today),
                Some(d) => d.format("%Y-%m-%d").to_string(),
                None => String::new(),
            };
            let mut description = task.description.clone();
            if let Some(parent) = task.parent_task_id {
                description.push_str(&format!(" (from #{})", parent));
            }
            [
                task.id.map(|id| id.to_string()).unwrap_or_default(),
                match task.status {
                    TaskStatus::Open => "open".to_string(),
                    TaskStatus::Completed => "done".to_string(),
                },
                description,
                project_label(names, task.project_id),
                due,
                format_recurrence(task.recurrence.as_deref()),
            ]
        })
        .collect();

    render_table(&["ID", "Status", "Description", "Project", "Due", "Repeats"], &rows)
}

/// Format event list as a table
pub fn format_event_list_table(events: &[Event], names: &ProjectNames) -> String {
    if events.is_empty() {
        return "No events found.".to_string();
    }

    let rows: Vec<[String; 6]> = events
        .iter()
        .map(|event| {
            [
                event.id.map(|id| id.to_string()).unwrap_or_default(),
                event.title.clone(),
                format_local(event.start_at),
                format_local(event.end_at),
                event.location.clone().unwrap_or_else(|| project_label(names, event.project_id)),
                format_recurrence(event.recurrence.as_deref()),
            ]
        })
        .collect();

    render_table(&["ID", "Title", "Start", "End", "Where", "Repeats"], &rows)
}

/// Format calendar entries as a table
pub fn format_calendar_table(entries: &[CalendarEntry]) -> String {
    if entries.is_empty() {
        return "Nothing scheduled.".to_string();
    }

    let rows: Vec<[String; 5]> = entries
        .iter()
        .map(|entry| {
            let when = match entry.kind {
                EntryKind::Task => entry.start.format("%Y-%m-%d").to_string(),
                EntryKind::Event => format_local(entry.start),
            };
            let end = match entry.end {
                Some(end) if entry.kind == EntryKind::Event => end.with_timezone(&Local).format("%H:%M").to_string(),
                _ => String::new(),
            };
            let kind = match entry.kind {
                EntryKind::Event => "event",
                EntryKind::Task => "task",
            };
            [
                when,
                end,
                kind.to_string(),
                format!("#{}", entry.parent_id),
                entry.title.clone(),
            ]
        })
        .collect();

    render_table(&["When", "Until", "Kind", "Ref", "Title"], &rows)
}

fn render_table<const N: usize>(headers: &[&str; N], rows: &[[String; N]]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let format_row = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(headers.to_vec()));
    lines.push("-".repeat(widths.iter().sum::<usize>() + widths.len().saturating_sub(1)));
    for row in rows {
        lines.push(format_row(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_relative_date() {
        let today = date(2024, 1, 10);
        assert_eq!(format_relative_date(today, today), "today");
        assert_eq!(format_relative_date(date(2024, 1, 11), today), "tomorrow");
        assert_eq!(format_relative_date(date(2024, 1, 9), today), "yesterday");
        assert_eq!(format_relative_date(date(2024, 1, 15), today), "in 5 days");
        assert_eq!(format_relative_date(date(2024, 1, 7), today), "3 days ago");
        assert_eq!(format_relative_date(date(2023, 6, 1), today), "2023-06-01");
    }

    #[test]
    fn test_format_recurrence() {
        assert_eq!(format_recurrence(None), "");
        assert_eq!(format_recurrence(Some(r#"{"pattern":"weekly","daysOfWeek":[1,3],"endType":"after","occurrences":4}"#)), "Weekly on Mon, Wed, 4 times");
        assert_eq!(format_recurrence(Some("nope")), "(invalid rule)");
    }

    #[test]
    fn test_task_table() {
        let mut task = Task::new("Inspect formwork".to_string());
        task.id = Some(3);
        task.project_id = Some(1);
        task.due_date = Some(date(2024, 1, 12));
        let names: ProjectNames = [(1, "tower-a".to_string())].into_iter().collect();

        let table = format_task_list_table(&[task], &names, date(2024, 1, 10), false);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].starts_with("ID"));
        assert!(lines[2].contains("Inspect formwork"));
        assert!(lines[2].contains("tower-a"));
        assert!(lines[2].contains("2024-01-12"));
    }

    #[test]
    fn test_empty_tables() {
        assert_eq!(format_task_list_table(&[], &ProjectNames::new(), date(2024, 1, 1), false), "No tasks found.");
        assert_eq!(format_event_list_table(&[], &ProjectNames::new()), "No events found.");
        assert_eq!(format_calendar_table(&[]), "Nothing scheduled.");
    }
}
