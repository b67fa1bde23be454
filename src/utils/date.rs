// Date expression parsing for command-line input and stored rule fields

use chrono::{DateTime, Days, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone};
use anyhow::{Context, Result};

/// Parse a calendar date as stored in a recurrence rule.
///
/// Accepts a plain `2024-01-05` or a full ISO instant such as
/// `2024-01-05T00:00:00.000Z`; for instants the date is taken in the
/// instant's own offset.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// Parse a date expression into a calendar date
///
/// Supports `2026-01-10`, `today`, `tomorrow`, `yesterday`, and relative
/// day offsets like `+7d` / `-30d` (counted from today).
pub fn parse_date_expr(expr: &str) -> Result<NaiveDate> {
    let expr = expr.trim();
    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        return Ok(date);
    }

    let today = Local::now().date_naive();
    match expr {
        "today" => return Ok(today),
        "tomorrow" => return offset_date(today, 1).context("Date out of range: tomorrow"),
        "yesterday" => return offset_date(today, -1).context("Date out of range: yesterday"),
        _ => {}
    }

    if let Some(days) = expr.strip_suffix('d') {
        if days.starts_with('+') || days.starts_with('-') {
            let offset: i64 = days.parse()
                .with_context(|| format!("Invalid day offset: {}", expr))?;
            return offset_date(today, offset)
                .with_context(|| format!("Date offset out of range: {}", expr));
        }
    }

    anyhow::bail!("Unsupported date expression: {}. Use YYYY-MM-DD, today, tomorrow, or +Nd/-Nd.", expr)
}

/// `date` moved by `days` (negative goes back), or `None` past the
/// representable calendar
pub fn offset_date(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let magnitude = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    }
}

/// Parse a date-time expression into an instant with an explicit offset
///
/// Supports RFC 3339 (`2026-01-10T14:30:00+10:00`), and local wall-clock
/// forms `2026-01-10T14:30` / `2026-01-10 14:30`, which take the local
/// offset in effect at that moment.
pub fn parse_datetime_expr(expr: &str) -> Result<DateTime<FixedOffset>> {
    let expr = expr.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(expr) {
        return Ok(dt);
    }

    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(expr, format) {
            return local_to_fixed(&naive);
        }
    }

    let date = parse_date_expr(expr)?;
    let midnight = date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("Invalid date"))?;
    local_to_fixed(&midnight)
}

/// Midnight at the start of `date` in the local offset
pub fn start_of_day(date: NaiveDate) -> Result<DateTime<FixedOffset>> {
    let midnight = date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("Invalid date"))?;
    local_to_fixed(&midnight)
}

/// Last second of `date` in the local offset
pub fn end_of_day(date: NaiveDate) -> Result<DateTime<FixedOffset>> {
    let last = date.and_hms_opt(23, 59, 59)
        .ok_or_else(|| anyhow::anyhow!("Invalid date"))?;
    local_to_fixed(&last)
}

fn local_to_fixed(naive: &NaiveDateTime) -> Result<DateTime<FixedOffset>> {
    let local_dt = Local.from_local_datetime(naive)
        .earliest()
        .ok_or_else(|| anyhow::anyhow!("Nonexistent local time: {}", naive))?;
    Ok(local_dt.fixed_offset())
}
