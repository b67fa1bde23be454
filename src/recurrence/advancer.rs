//! Pattern stepping
//!
//! [`advance`] computes the next candidate date for a rule's pattern and
//! [`matches`] is the inclusion predicate deciding whether a candidate is a
//! real occurrence. Both are pure functions of their arguments.
//!
//! Monthly and yearly rules keep the anchor's day of month. In months that
//! are too short the date is clamped to the last day of the month (Jan 31 ->
//! Feb 29 -> Mar 31). Each step is computed from the anchor rather than from
//! the previous clamped date, so a short month never shifts the rest of the
//! series.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use crate::recurrence::rule::{Pattern, RecurrenceRule};

/// Days searched forward for the next matching weekday of a weekly rule
pub const WEEKLY_SEARCH_LIMIT: u64 = 14;

/// Next candidate date after `current`
///
/// `anchor` is the series start date; monthly and yearly steps take their
/// day of month from it.
///
/// A weekly rule with explicit days steps to the next listed weekday and
/// does not apply `interval`, so "every 2 weeks on Mon, Wed" behaves like
/// "every week on Mon, Wed".
pub fn advance(current: NaiveDate, rule: &RecurrenceRule, anchor: NaiveDate) -> NaiveDate {
    let interval = rule.interval();
    match &rule.pattern {
        Pattern::Daily | Pattern::Weekdays => add_days(current, u64::from(interval)),
        Pattern::Weekly { days } if days.is_empty() => add_days(current, 7 * u64::from(interval)),
        Pattern::Weekly { days } => next_matching_weekday(current, days),
        Pattern::Monthly => {
            let elapsed = months_between(anchor, current);
            add_months_clamped(anchor, elapsed.saturating_add(interval))
        }
        Pattern::Yearly => {
            let elapsed = months_between(anchor, current) / 12;
            add_months_clamped(anchor, elapsed.saturating_add(interval).saturating_mul(12))
        }
    }
}

/// Inclusion predicate: is `date` an occurrence of the rule's pattern?
///
/// - daily: always
/// - weekly: weekday is listed (or equals the anchor's weekday when none are)
/// - monthly: day of month equals the anchor's, clamped to the month length
/// - yearly: month and clamped day equal the anchor's
/// - weekdays: Monday through Friday
pub fn matches(date: NaiveDate, rule: &RecurrenceRule, anchor: NaiveDate) -> bool {
    match &rule.pattern {
        Pattern::Daily => true,
        Pattern::Weekly { days } if days.is_empty() => date.weekday() == anchor.weekday(),
        Pattern::Weekly { days } => days.contains(&date.weekday()),
        Pattern::Monthly => date.day() == clamped_day(anchor.day(), date.year(), date.month()),
        Pattern::Yearly => {
            date.month() == anchor.month()
                && date.day() == clamped_day(anchor.day(), date.year(), date.month())
        }
        Pattern::Weekdays => !matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
    }
}

/// Whole calendar months from `from` to `to` (0 when `to` is not later)
pub(crate) fn months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let from_months = from.year() * 12 + from.month0() as i32;
    let to_months = to.year() * 12 + to.month0() as i32;
    u32::try_from(to_months - from_months).unwrap_or(0)
}

/// `date` plus `months`, clamping the day to the target month's length.
/// Saturates at `NaiveDate::MAX`.
pub(crate) fn add_months_clamped(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(NaiveDate::MAX)
}

/// `date` plus `days`, saturating at `NaiveDate::MAX`
pub(crate) fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

fn clamped_day(day: u32, year: i32, month: u32) -> u32 {
    day.min(days_in_month(year, month))
}

fn next_matching_weekday(from: NaiveDate, weekdays: &[Weekday]) -> NaiveDate {
    let mut current = from;
    for _ in 0..WEEKLY_SEARCH_LIMIT {
        current = add_days(current, 1);
        if weekdays.contains(&current.weekday()) {
            return current;
        }
    }
    current
}

fn days_in_month(year: i32, month: u32) -> u32 {
    // Day before the first of the following month
    let (next_year, next_month) = if month >= 12 { (year.saturating_add(1), 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}
