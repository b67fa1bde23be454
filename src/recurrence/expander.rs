//! Window-bounded occurrence expansion
//!
//! Walks a rule's candidate dates from the anchor (or from a pattern-aligned
//! seed near the window start), applies the inclusion predicate, exceptions
//! and the end condition, and collects the occurrences whose start falls in
//! the requested window.
//!
//! Counting rules for `after` series:
//! - the count starts at the anchor, even when the window starts later
//! - an excepted date still uses up one occurrence of the count

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};

use crate::recurrence::advancer::{add_days, add_months_clamped, advance, matches, months_between};
use crate::recurrence::occurrence::{Anchor, Occurrence};
use crate::recurrence::rule::{EndCondition, Pattern, RecurrenceRule};

/// Default cap on loop iterations per expansion
///
/// Expansion stops silently when the cap is reached, so an oversized window
/// yields a truncated list instead of hanging.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Expand `rule` on `anchor` within `[window_start, window_end]`
pub fn expand<A: Anchor>(
    anchor: &A,
    rule: &RecurrenceRule,
    window_start: DateTime<FixedOffset>,
    window_end: DateTime<FixedOffset>,
) -> Vec<Occurrence<A>> {
    expand_with_limit(anchor, rule, window_start, window_end, DEFAULT_MAX_ITERATIONS)
}

/// [`expand`] with an explicit iteration cap
pub fn expand_with_limit<A: Anchor>(
    anchor: &A,
    rule: &RecurrenceRule,
    window_start: DateTime<FixedOffset>,
    window_end: DateTime<FixedOffset>,
    max_iterations: usize,
) -> Vec<Occurrence<A>> {
    let mut occurrences = Vec::new();

    let Some(anchor_start) = anchor.anchor_start() else {
        return occurrences;
    };
    if window_end < window_start {
        return occurrences;
    }

    let offset = *anchor_start.offset();
    let time_of_day = anchor_start.time();
    let anchor_date = anchor_start.date_naive();
    let window_start_date = window_start.with_timezone(&offset).date_naive();

    let mut cursor = seed_date(anchor_date, rule, window_start_date);
    let mut accepted = 0u32;
    let mut iterations = 0usize;

    loop {
        if iterations >= max_iterations {
            log::debug!(
                "Stopped expanding {} after {} iterations at {}",
                anchor.anchor_id(),
                iterations,
                cursor
            );
            break;
        }
        iterations += 1;

        let Some(start) = at_time(cursor, time_of_day, offset) else {
            break;
        };
        if start > window_end {
            break;
        }

        match rule.end {
            EndCondition::Until(end_date) if cursor > end_date => break,
            EndCondition::After(limit) if accepted >= limit.get() => break,
            _ => {}
        }

        if matches(cursor, rule, anchor_date) {
            accepted += 1;
            if !rule.is_excepted(cursor) && start >= window_start {
                occurrences.push(Occurrence::instance(anchor, start));
            }
        }

        cursor = advance(cursor, rule, anchor_date);
    }

    occurrences
}

/// Expand an anchor whose rule is still in stored JSON form
///
/// Without a rule the anchor shows up once, if it starts inside the window.
/// A rule that fails to parse or validate yields nothing, so one corrupt row
/// cannot break a whole calendar.
pub fn expand_stored<A: Anchor>(
    anchor: &A,
    stored: Option<&str>,
    window_start: DateTime<FixedOffset>,
    window_end: DateTime<FixedOffset>,
    max_iterations: usize,
) -> Vec<Occurrence<A>> {
    let Some(json) = stored.filter(|s| !s.trim().is_empty()) else {
        return Occurrence::single(anchor)
            .filter(|o| o.start >= window_start && o.start <= window_end)
            .into_iter()
            .collect();
    };

    match RecurrenceRule::from_json(json) {
        Ok(rule) => expand_with_limit(anchor, &rule, window_start, window_end, max_iterations),
        Err(e) => {
            log::warn!("Skipping {}: unusable recurrence rule: {}", anchor.anchor_id(), e);
            Vec::new()
        }
    }
}

/// Where the walk starts
///
/// The anchor date, unless the window opens later and the series does not
/// end after a count. In that case the walk jumps to a pattern-aligned date
/// no later than the first in-window candidate, so it visits the same
/// in-window dates a walk from the anchor would.
fn seed_date(anchor: NaiveDate, rule: &RecurrenceRule, window_start: NaiveDate) -> NaiveDate {
    if window_start <= anchor || matches!(rule.end, EndCondition::After(_)) {
        return anchor;
    }

    let interval = u64::from(rule.interval());
    let elapsed_days = u64::try_from((window_start - anchor).num_days()).unwrap_or(0);
    match &rule.pattern {
        Pattern::Daily | Pattern::Weekdays => {
            add_days(anchor, elapsed_days / interval * interval)
        }
        Pattern::Weekly { days } if days.is_empty() => {
            let step = 7 * interval;
            add_days(anchor, elapsed_days / step * step)
        }
        // Listed weekdays are found by day-by-day stepping, so any date works
        Pattern::Weekly { .. } => window_start,
        Pattern::Monthly => {
            let step = rule.interval();
            let elapsed = months_between(anchor, window_start);
            add_months_clamped(anchor, elapsed / step * step)
        }
        Pattern::Yearly => {
            let step = rule.interval();
            let elapsed = months_between(anchor, window_start) / 12;
            add_months_clamped(anchor, (elapsed / step * step).saturating_mul(12))
        }
    }
}

fn at_time(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    offset.from_local_datetime(&date.and_time(time)).single()
}
