//! Recurrence rule validation
//!
//! Checks a [`RawRecurrenceRule`] and converts it into a [`RecurrenceRule`].
//! Validation never panics and never touches its input; the first problem
//! found is returned as a [`RuleError`].

use std::collections::BTreeSet;
use std::num::NonZeroU32;

use chrono::Weekday;

use crate::error::{RuleError, RuleResult};
use crate::recurrence::rule::{weekday_from_index, EndCondition, Pattern, RawRecurrenceRule, RecurrenceRule};
use crate::utils::parse_calendar_date;

/// Validate a raw rule
///
/// A weekly rule with no `daysOfWeek` is valid: it repeats on the anchor's
/// own weekday. `daysOfWeek` is ignored for the other patterns.
pub fn validate(raw: &RawRecurrenceRule) -> RuleResult<()> {
    parse(raw).map(|_| ())
}

/// Validate a raw rule and build the typed rule from it
pub fn parse(raw: &RawRecurrenceRule) -> RuleResult<RecurrenceRule> {
    let pattern = parse_pattern(raw)?;
    let interval = parse_interval(raw.interval)?;
    let end = parse_end(raw)?;

    let mut exceptions = BTreeSet::new();
    for value in &raw.exceptions {
        let date = parse_calendar_date(value)
            .ok_or_else(|| RuleError::InvalidException(value.clone()))?;
        exceptions.insert(date);
    }

    Ok(RecurrenceRule { pattern, interval, end, exceptions })
}

fn parse_pattern(raw: &RawRecurrenceRule) -> RuleResult<Pattern> {
    match raw.pattern.trim().to_lowercase().as_str() {
        "daily" => Ok(Pattern::Daily),
        "weekly" => {
            let days = parse_days_of_week(raw.days_of_week.as_deref().unwrap_or_default())?;
            Ok(Pattern::Weekly { days })
        }
        "monthly" => Ok(Pattern::Monthly),
        "yearly" => Ok(Pattern::Yearly),
        "weekdays" => Ok(Pattern::Weekdays),
        _ => Err(RuleError::UnknownPattern(raw.pattern.clone())),
    }
}

fn parse_interval(interval: Option<i64>) -> RuleResult<NonZeroU32> {
    let Some(value) = interval else {
        return Ok(NonZeroU32::MIN);
    };
    u32::try_from(value)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or(RuleError::InvalidInterval(value))
}

fn parse_days_of_week(values: &[i64]) -> RuleResult<Vec<Weekday>> {
    let mut days: Vec<Weekday> = Vec::with_capacity(values.len());
    for &value in values {
        let day = weekday_from_index(value).ok_or(RuleError::DayOfWeekOutOfRange(value))?;
        if days.contains(&day) {
            return Err(RuleError::DuplicateDayOfWeek(value));
        }
        days.push(day);
    }
    days.sort_by_key(|d| d.num_days_from_sunday());
    Ok(days)
}

fn parse_end(raw: &RawRecurrenceRule) -> RuleResult<EndCondition> {
    match raw.end_type.trim().to_lowercase().as_str() {
        "never" => Ok(EndCondition::Never),
        "until" => {
            let value = raw.end_date.as_deref()
                .filter(|s| !s.trim().is_empty())
                .ok_or(RuleError::MissingEndDate)?;
            let date = parse_calendar_date(value)
                .ok_or_else(|| RuleError::InvalidEndDate(value.to_string()))?;
            Ok(EndCondition::Until(date))
        }
        "after" => raw.occurrences
            .and_then(|n| u32::try_from(n).ok())
            .and_then(NonZeroU32::new)
            .map(EndCondition::After)
            .ok_or(RuleError::MissingOccurrences),
        _ => Err(RuleError::UnknownEndType(raw.end_type.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(pattern: &str, end_type: &str) -> RawRecurrenceRule {
        RawRecurrenceRule {
            pattern: pattern.to_string(),
            end_type: end_type.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_all_patterns_valid_with_end_condition() {
        for pattern in ["daily", "weekly", "monthly", "yearly", "weekdays"] {
            let mut until = raw(pattern, "until");
            until.end_date = Some("2024-06-30".to_string());
            assert!(validate(&until).is_ok(), "{} until", pattern);

            let mut after = raw(pattern, "after");
            after.occurrences = Some(3);
            assert!(validate(&after).is_ok(), "{} after", pattern);

            assert!(validate(&raw(pattern, "never")).is_ok(), "{} never", pattern);
        }
    }

    #[test]
    fn test_unknown_pattern() {
        assert_eq!(
            validate(&raw("fortnightly", "never")),
            Err(RuleError::UnknownPattern("fortnightly".to_string()))
        );
        assert!(validate(&raw("", "never")).is_err());
    }

    #[test]
    fn test_until_requires_end_date() {
        assert_eq!(validate(&raw("daily", "until")), Err(RuleError::MissingEndDate));

        let mut blank = raw("daily", "until");
        blank.end_date = Some("  ".to_string());
        assert_eq!(validate(&blank), Err(RuleError::MissingEndDate));

        let mut garbage = raw("daily", "until");
        garbage.end_date = Some("someday".to_string());
        assert_eq!(validate(&garbage), Err(RuleError::InvalidEndDate("someday".to_string())));
    }

    #[test]
    fn test_after_requires_positive_occurrences() {
        assert_eq!(validate(&raw("daily", "after")), Err(RuleError::MissingOccurrences));

        let mut zero = raw("daily", "after");
        zero.occurrences = Some(0);
        assert_eq!(validate(&zero), Err(RuleError::MissingOccurrences));

        let mut negative = raw("daily", "after");
        negative.occurrences = Some(-2);
        assert_eq!(validate(&negative), Err(RuleError::MissingOccurrences));
    }

    #[test]
    fn test_unknown_end_type() {
        assert_eq!(
            validate(&raw("daily", "eventually")),
            Err(RuleError::UnknownEndType("eventually".to_string()))
        );
    }

    #[test]
    fn test_interval_must_be_positive() {
        let mut rule = raw("daily", "never");
        rule.interval = Some(0);
        assert_eq!(validate(&rule), Err(RuleError::InvalidInterval(0)));
        rule.interval = Some(-3);
        assert_eq!(validate(&rule), Err(RuleError::InvalidInterval(-3)));
        rule.interval = None;
        assert_eq!(parse(&rule).unwrap().interval(), 1);
    }

    #[test]
    fn test_weekly_without_days_is_valid() {
        let rule = parse(&raw("weekly", "never")).unwrap();
        assert_eq!(rule.pattern, Pattern::Weekly { days: vec![] });

        let mut empty = raw("weekly", "never");
        empty.days_of_week = Some(vec![]);
        assert!(validate(&empty).is_ok());
    }

    #[test]
    fn test_days_of_week_checked() {
        let mut rule = raw("weekly", "never");
        rule.days_of_week = Some(vec![1, 7]);
        assert_eq!(validate(&rule), Err(RuleError::DayOfWeekOutOfRange(7)));

        rule.days_of_week = Some(vec![3, 1, 3]);
        assert_eq!(validate(&rule), Err(RuleError::DuplicateDayOfWeek(3)));

        rule.days_of_week = Some(vec![5, 1, 3]);
        assert_eq!(
            parse(&rule).unwrap().pattern,
            Pattern::Weekly { days: vec![Weekday::Mon, Weekday::Wed, Weekday::Fri] }
        );
    }

    #[test]
    fn test_days_of_week_ignored_outside_weekly() {
        let mut rule = raw("daily", "never");
        rule.days_of_week = Some(vec![42]);
        assert_eq!(parse(&rule).unwrap().pattern, Pattern::Daily);
    }

    #[test]
    fn test_exceptions_parsed_and_checked() {
        let mut rule = raw("daily", "never");
        rule.exceptions = vec![
            "2024-01-05".to_string(),
            "2024-01-03T00:00:00.000Z".to_string(),
            "2024-01-05".to_string(),
        ];
        let parsed = parse(&rule).unwrap();
        let dates: Vec<NaiveDate> = parsed.exceptions.into_iter().collect();
        assert_eq!(dates, vec![
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        ]);

        rule.exceptions.push("not-a-date".to_string());
        assert_eq!(validate(&rule), Err(RuleError::InvalidException("not-a-date".to_string())));
    }

    #[test]
    fn test_case_and_whitespace_tolerated() {
        assert!(validate(&raw(" Weekly ", "NEVER")).is_ok());
    }

    #[test]
    fn test_validate_does_not_mutate() {
        let mut rule = raw("weekly", "after");
        rule.occurrences = Some(2);
        rule.days_of_week = Some(vec![5, 1]);
        let before = rule.clone();
        validate(&rule).unwrap();
        assert_eq!(rule, before);
    }
}
