//! Error types for sitecal.

use thiserror::Error;

/// Reasons a recurrence rule is rejected by the validator.
///
/// The `Display` text is meant to be shown to the person editing the rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Unknown recurrence pattern: '{0}' (expected daily, weekly, monthly, yearly, or weekdays)")]
    UnknownPattern(String),

    #[error("Unknown end type: '{0}' (expected never, until, or after)")]
    UnknownEndType(String),

    #[error("An end date is required when the rule ends on a date")]
    MissingEndDate,

    #[error("Invalid end date: '{0}'")]
    InvalidEndDate(String),

    #[error("An occurrence count of at least 1 is required when the rule ends after a number of occurrences")]
    MissingOccurrences,

    #[error("Interval must be a positive number: {0}")]
    InvalidInterval(i64),

    #[error("Day of week must be between 0 (Sunday) and 6 (Saturday): {0}")]
    DayOfWeekOutOfRange(i64),

    #[error("Day of week listed more than once: {0}")]
    DuplicateDayOfWeek(i64),

    #[error("Invalid exception date: '{0}'")]
    InvalidException(String),

    #[error("Malformed recurrence rule: {0}")]
    Malformed(String),
}

/// Errors surfaced by the repository layer that are the caller's fault
/// rather than a storage failure.
#[derive(Error, Debug)]
pub enum SitecalError {
    #[error("Invalid recurrence rule: {0}")]
    Rule(#[from] RuleError),

    #[error("Task {0} not found")]
    TaskNotFound(i64),

    #[error("Event {0} not found")]
    EventNotFound(i64),

    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("Project '{0}' already exists")]
    ProjectExists(String),

    #[error("Event must not end before it starts")]
    EventEndsBeforeStart,

    #[error("Failed to serialize recurrence rule: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for rule validation.
pub type RuleResult<T> = Result<T, RuleError>;
