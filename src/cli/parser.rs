// CLI parsing utilities: recurrence flags and free-text arguments

use clap::Args;

use crate::recurrence::{RawRecurrenceRule, RecurrenceRule};
use crate::utils::parse_date_expr;

/// Recurrence flags shared by `add` and `events add`
#[derive(Args, Debug, Default, Clone)]
pub struct RecurrenceArgs {
    /// Repeat pattern: daily, weekly, monthly, yearly, weekdays
    #[arg(long, value_name = "PATTERN")]
    pub repeat: Option<String>,
    /// Repeat every N days/weeks/months/years
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub every: Option<i64>,
    /// Weekdays for weekly repeats (e.g. mon,wed,fri)
    #[arg(long, value_name = "DAYS")]
    pub on: Option<String>,
    /// Last date a repeat can fall on
    #[arg(long, value_name = "DATE", conflicts_with = "count")]
    pub until: Option<String>,
    /// Stop after this many occurrences
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub count: Option<i64>,
    /// Skip a date (repeatable)
    #[arg(long, value_name = "DATE")]
    pub except: Vec<String>,
}

impl RecurrenceArgs {
    fn has_modifiers(&self) -> bool {
        self.every.is_some()
            || self.on.is_some()
            || self.until.is_some()
            || self.count.is_some()
            || !self.except.is_empty()
    }

    /// Raw rule as it will be stored, or `None` without `--repeat`
    ///
    /// Date flags accept the same expressions as `--due` and are stored as
    /// plain dates. The result still has to be validated.
    pub fn to_raw(&self) -> Result<Option<RawRecurrenceRule>, String> {
        let Some(pattern) = &self.repeat else {
            if self.has_modifiers() {
                return Err("--every, --on, --until, --count and --except need --repeat".to_string());
            }
            return Ok(None);
        };

        let (end_type, end_date) = match (&self.until, self.count) {
            (Some(until), _) => ("until", Some(format_date_expr(until)?)),
            (None, Some(_)) => ("after", None),
            (None, None) => ("never", None),
        };

        let days_of_week = self.on.as_deref().map(parse_weekday_list).transpose()?;

        let exceptions = self.except
            .iter()
            .map(|expr| format_date_expr(expr))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(RawRecurrenceRule {
            pattern: pattern.clone(),
            interval: self.every,
            days_of_week,
            end_type: end_type.to_string(),
            end_date,
            occurrences: self.count,
            exceptions,
        }))
    }

    /// Validated rule, or `None` without `--repeat`
    pub fn to_rule(&self) -> Result<Option<RecurrenceRule>, String> {
        match self.to_raw()? {
            Some(raw) => raw.into_rule().map(Some).map_err(|e| e.to_string()),
            None => Ok(None),
        }
    }
}

fn format_date_expr(expr: &str) -> Result<String, String> {
    parse_date_expr(expr)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|e| e.to_string())
}

/// Parse "mon,wed,fri" (names, 3-letter abbreviations or 0-6 with 0 =
/// Sunday) into day indexes
///
/// Duplicates are kept so the validator can report them.
pub fn parse_weekday_list(value: &str) -> Result<Vec<i64>, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|token| {
            let lower = token.to_lowercase();
            if let Ok(n) = lower.parse::<i64>() {
                return Ok(n);
            }
            const NAMES: [&str; 7] = ["sunday", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday"];
            NAMES
                .iter()
                .position(|name| lower.len() >= 3 && name.starts_with(&lower))
                .map(|i| i as i64)
                .ok_or_else(|| format!("Unknown day of week: '{}'", token))
        })
        .collect()
}

/// Join free-text words into a description
pub fn join_description(parts: &[String]) -> String {
    parts.join(" ").trim().to_string()
}
