//! Recurrence rule data model
//!
//! Two shapes of the same rule live here:
//!
//! - [`RawRecurrenceRule`] is the loosely typed record stored as JSON in the
//!   `recurrence` column of tasks and events. Anything can be in it, which is
//!   why it has to go through the validator before use.
//! - [`RecurrenceRule`] is the validated form the engine works with. The
//!   pattern and end condition are sum types, so pattern-specific fields only
//!   exist where they mean something and the end type always agrees with its
//!   payload.

use std::collections::BTreeSet;
use std::num::NonZeroU32;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{RuleError, RuleResult};
use crate::recurrence::validator;

/// Persisted rule encoding (camelCase JSON)
///
/// ```json
/// {"pattern":"weekly","interval":1,"daysOfWeek":[1,3,5],"endType":"never","exceptions":[]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecurrenceRule {
    #[serde(default)]
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<i64>>,
    #[serde(default)]
    pub end_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<i64>,
    #[serde(default)]
    pub exceptions: Vec<String>,
}

impl RawRecurrenceRule {
    /// Parse the stored JSON blob. This only checks the JSON shape; call
    /// [`RawRecurrenceRule::validate`] or [`RawRecurrenceRule::into_rule`]
    /// for the semantic checks.
    pub fn from_json(json: &str) -> RuleResult<Self> {
        serde_json::from_str(json).map_err(|e| RuleError::Malformed(e.to_string()))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Check the rule without converting it
    pub fn validate(&self) -> RuleResult<()> {
        validator::validate(self)
    }

    /// Validate and convert into the typed rule
    pub fn into_rule(self) -> RuleResult<RecurrenceRule> {
        validator::parse(&self)
    }
}

/// Repetition family
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Daily,
    /// Weekly on the listed days, sorted Sunday first. An empty list means
    /// "the anchor's own weekday".
    Weekly { days: Vec<Weekday> },
    Monthly,
    Yearly,
    /// Every Monday through Friday
    Weekdays,
}

impl Pattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::Daily => "daily",
            Pattern::Weekly { .. } => "weekly",
            Pattern::Monthly => "monthly",
            Pattern::Yearly => "yearly",
            Pattern::Weekdays => "weekdays",
        }
    }

    /// Weekly pattern from day indexes (0 = Sunday). Out-of-range indexes
    /// are dropped; use the validator for raw input.
    pub fn weekly_on(days: &[i64]) -> Self {
        let mut weekdays: Vec<Weekday> = days.iter().filter_map(|d| weekday_from_index(*d)).collect();
        weekdays.sort_by_key(|d| d.num_days_from_sunday());
        weekdays.dedup();
        Pattern::Weekly { days: weekdays }
    }
}

/// When a series stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCondition {
    Never,
    /// Last possible occurrence date (inclusive)
    Until(NaiveDate),
    /// Total number of occurrences, counted from the anchor
    After(NonZeroU32),
}

impl EndCondition {
    /// `After(count)`, or `None` for a zero count
    pub fn after(count: u32) -> Option<Self> {
        NonZeroU32::new(count).map(EndCondition::After)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EndCondition::Never => "never",
            EndCondition::Until(_) => "until",
            EndCondition::After(_) => "after",
        }
    }
}

/// Validated recurrence rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub pattern: Pattern,
    pub interval: NonZeroU32,
    pub end: EndCondition,
    pub exceptions: BTreeSet<NaiveDate>,
}

impl RecurrenceRule {
    /// Rule repeating every pattern unit, forever, with no exceptions
    pub fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            interval: NonZeroU32::MIN,
            end: EndCondition::Never,
            exceptions: BTreeSet::new(),
        }
    }

    /// Repeat every `interval` pattern units (0 is treated as 1)
    pub fn every(mut self, interval: u32) -> Self {
        self.interval = NonZeroU32::new(interval).unwrap_or(NonZeroU32::MIN);
        self
    }

    pub fn ending(mut self, end: EndCondition) -> Self {
        self.end = end;
        self
    }

    pub fn except(mut self, date: NaiveDate) -> Self {
        self.exceptions.insert(date);
        self
    }

    pub fn interval(&self) -> u32 {
        self.interval.get()
    }

    pub fn is_excepted(&self, date: NaiveDate) -> bool {
        self.exceptions.contains(&date)
    }

    /// Parse and validate a stored JSON blob
    pub fn from_json(json: &str) -> RuleResult<Self> {
        RawRecurrenceRule::from_json(json)?.into_rule()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        self.to_raw().to_json()
    }

    /// Persisted encoding of this rule
    pub fn to_raw(&self) -> RawRecurrenceRule {
        let days_of_week = match &self.pattern {
            Pattern::Weekly { days } if !days.is_empty() => {
                Some(days.iter().map(|d| weekday_index(*d)).collect())
            }
            _ => None,
        };
        let (end_date, occurrences) = match self.end {
            EndCondition::Never => (None, None),
            EndCondition::Until(date) => (Some(date.format("%Y-%m-%d").to_string()), None),
            EndCondition::After(count) => (None, Some(i64::from(count.get()))),
        };

        RawRecurrenceRule {
            pattern: self.pattern.as_str().to_string(),
            interval: Some(i64::from(self.interval.get())),
            days_of_week,
            end_type: self.end.as_str().to_string(),
            end_date,
            occurrences,
            exceptions: self.exceptions.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect(),
        }
    }
}

/// Day index as stored in `daysOfWeek` (0 = Sunday .. 6 = Saturday)
pub fn weekday_index(day: Weekday) -> i64 {
    i64::from(day.num_days_from_sunday())
}

pub fn weekday_from_index(index: i64) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}
