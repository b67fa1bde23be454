//! Next due date for recurring tasks
//!
//! A recurring task spawns its follow-up only when it is completed, so there
//! is never more than one future instance in storage. This module computes
//! the follow-up's due date; creating the row is the task repository's job.

use chrono::NaiveDate;

use crate::recurrence::advancer::{advance, matches};
use crate::recurrence::expander::DEFAULT_MAX_ITERATIONS;
use crate::recurrence::rule::{EndCondition, RecurrenceRule};

/// One pattern step from `current_due`
///
/// Plain date arithmetic: no exceptions, no end condition. Monthly and
/// yearly rules clamp to the last day of short months, so a task due on
/// Jan 31, 2024 is next due Feb 29, 2024.
pub fn next_due_date(current_due: NaiveDate, rule: &RecurrenceRule) -> NaiveDate {
    advance(current_due, rule, current_due)
}

/// Due date of the instance to spawn when a task due `current_due` is
/// completed, or `None` when the series has run out
///
/// - candidates that are not real occurrences (a weekend for `weekdays`)
///   are stepped over
/// - excepted dates are stepped over, but they still count toward an
///   `after` limit
/// - the completed task is the first occurrence of an `after` series, so a
///   limit of 1 never spawns
/// - a candidate past an `until` date ends the series
pub fn next_task_due(current_due: NaiveDate, rule: &RecurrenceRule) -> Option<NaiveDate> {
    let mut candidate = current_due;
    let mut counted = 1u32;

    for _ in 0..DEFAULT_MAX_ITERATIONS {
        let next = advance(candidate, rule, current_due);
        if next <= candidate {
            // Saturated at the end of the calendar
            return None;
        }
        candidate = next;

        if let EndCondition::Until(end_date) = rule.end {
            if candidate > end_date {
                return None;
            }
        }
        if !matches(candidate, rule, current_due) {
            continue;
        }

        counted += 1;
        if let EndCondition::After(limit) = rule.end {
            if counted > limit.get() {
                return None;
            }
        }
        if rule.is_excepted(candidate) {
            continue;
        }
        return Some(candidate);
    }

    log::debug!("No next due date found within {} steps of {}", DEFAULT_MAX_ITERATIONS, current_due);
    None
}

/// [`next_task_due`] for a rule still in its stored JSON form
///
/// A missing, malformed or invalid rule means "does not recur".
pub fn next_due_for_stored(current_due: NaiveDate, stored: Option<&str>) -> Option<NaiveDate> {
    let json = stored.filter(|s| !s.trim().is_empty())?;
    match RecurrenceRule::from_json(json) {
        Ok(rule) => next_task_due(current_due, &rule),
        Err(e) => {
            log::warn!("Ignoring unusable recurrence rule {:?}: {}", json, e);
            None
        }
    }
}
