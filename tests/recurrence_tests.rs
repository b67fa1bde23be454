// Recurrence engine scenarios through the public library API

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike};
use sitecal::error::RuleError;
use sitecal::models::Event;
use sitecal::recurrence::{
    describe, expand, expand_with_limit, next_due_date, validate, EndCondition, Pattern, RawRecurrenceRule,
    RecurrenceRule, DEFAULT_MAX_ITERATIONS,
};

fn at(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn event_at(start: &str, end: &str) -> Event {
    let mut event = Event::new("Site meeting".to_string(), at(start), at(end)).unwrap();
    event.id = Some(1);
    event
}

fn rule_from(json: &str) -> RecurrenceRule {
    RecurrenceRule::from_json(json).unwrap()
}

#[test]
fn test_daily_after_five() {
    let anchor = event_at("2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z");
    let rule = rule_from(r#"{"pattern":"daily","interval":1,"endType":"after","occurrences":5}"#);

    let occurrences = expand(&anchor, &rule, at("2024-01-01T00:00:00Z"), at("2024-01-31T23:59:59Z"));

    let days: Vec<u32> = occurrences.iter().map(|o| o.start.day()).collect();
    assert_eq!(days, vec![1, 2, 3, 4, 5]);
    for occurrence in &occurrences {
        assert_eq!(occurrence.start.hour(), 9);
        assert_eq!(occurrence.start.minute(), 0);
        assert_eq!(occurrence.parent_id, "1");
        assert!(occurrence.is_instance);
    }
}

#[test]
fn test_weekly_mon_wed_fri() {
    let anchor = event_at("2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z");
    let rule = rule_from(r#"{"pattern":"weekly","daysOfWeek":[1,3,5],"endType":"never"}"#);

    let occurrences = expand(&anchor, &rule, at("2024-01-01T00:00:00Z"), at("2024-01-15T23:59:59Z"));

    let days: Vec<u32> = occurrences.iter().map(|o| o.start.day()).collect();
    assert_eq!(days, vec![1, 3, 5, 8, 10, 12, 15]);
}

#[test]
fn test_weekly_with_exception() {
    let anchor = event_at("2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z");
    let rule = rule_from(r#"{"pattern":"weekly","daysOfWeek":[1,3,5],"endType":"never","exceptions":["2024-01-05"]}"#);

    let occurrences = expand(&anchor, &rule, at("2024-01-01T00:00:00Z"), at("2024-01-15T23:59:59Z"));

    let days: Vec<u32> = occurrences.iter().map(|o| o.start.day()).collect();
    assert_eq!(days, vec![1, 3, 8, 10, 12, 15]);
}

#[test]
fn test_month_end_due_date_clamps() {
    let rule = rule_from(r#"{"pattern":"monthly","interval":1,"endType":"never"}"#);

    let february = next_due_date(date(2024, 1, 31), &rule);
    assert_eq!(february, date(2024, 2, 29));

    // The event calendar keeps the 31st after a short month
    let anchor = event_at("2024-01-31T09:00:00Z", "2024-01-31T10:00:00Z");
    let dates: Vec<NaiveDate> = expand(&anchor, &rule, at("2024-01-01T00:00:00Z"), at("2024-04-30T23:59:59Z"))
        .iter()
        .map(|o| o.start.date_naive())
        .collect();
    assert_eq!(dates, vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]);
}

#[test]
fn test_every_other_week_on_days_matches_weekly() {
    // Interval is not applied when explicit weekdays are listed
    let anchor = event_at("2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z");
    let weekly = rule_from(r#"{"pattern":"weekly","daysOfWeek":[1,3],"endType":"never"}"#);
    let fortnightly = rule_from(r#"{"pattern":"weekly","interval":2,"daysOfWeek":[1,3],"endType":"never"}"#);

    let ws = at("2024-01-01T00:00:00Z");
    let we = at("2024-01-31T23:59:59Z");
    assert_eq!(expand(&anchor, &weekly, ws, we), expand(&anchor, &fortnightly, ws, we));
}

#[test]
fn test_validation_cases() {
    let until_without_date = RawRecurrenceRule::from_json(r#"{"pattern":"daily","endType":"until"}"#).unwrap();
    assert_eq!(validate(&until_without_date), Err(RuleError::MissingEndDate));

    let after_zero = RawRecurrenceRule::from_json(r#"{"pattern":"daily","endType":"after","occurrences":0}"#).unwrap();
    assert_eq!(validate(&after_zero), Err(RuleError::MissingOccurrences));

    for pattern in ["daily", "weekly", "monthly", "yearly", "weekdays"] {
        let json = format!(r#"{{"pattern":"{}","endType":"until","endDate":"2024-12-31"}}"#, pattern);
        let raw = RawRecurrenceRule::from_json(&json).unwrap();
        assert!(validate(&raw).is_ok(), "{} should be valid", pattern);
    }
}

#[test]
fn test_exhausted_until_is_empty() {
    let anchor = event_at("2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z");
    let rule = RecurrenceRule::new(Pattern::Daily).ending(EndCondition::Until(date(2024, 1, 31)));
    assert!(expand(&anchor, &rule, at("2024-02-01T00:00:00Z"), at("2024-03-01T00:00:00Z")).is_empty());
}

#[test]
fn test_after_count_exact_in_unbounded_window() {
    let anchor = event_at("2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z");
    for (pattern, n) in [
        (Pattern::Daily, 12),
        (Pattern::Weekly { days: vec![] }, 7),
        (Pattern::weekly_on(&[2, 4]), 9),
        (Pattern::Monthly, 14),
        (Pattern::Yearly, 3),
        (Pattern::Weekdays, 11),
    ] {
        let rule = RecurrenceRule::new(pattern.clone()).ending(EndCondition::after(n).unwrap());
        let occurrences = expand(&anchor, &rule, at("2024-01-01T00:00:00Z"), at("2099-12-31T23:59:59Z"));
        assert_eq!(occurrences.len(), n as usize, "{:?}", pattern);
    }
}

#[test]
fn test_large_window_is_truncated_not_hung() {
    let anchor = event_at("2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z");
    let rule = RecurrenceRule::new(Pattern::Daily);
    let occurrences = expand(&anchor, &rule, at("2024-01-01T00:00:00Z"), at("2999-12-31T23:59:59Z"));
    assert_eq!(occurrences.len(), DEFAULT_MAX_ITERATIONS);

    let bigger = expand_with_limit(&anchor, &rule, at("2024-01-01T00:00:00Z"), at("2999-12-31T23:59:59Z"), 5000);
    assert_eq!(bigger.len(), 5000);
}

#[test]
fn test_describe_examples() {
    assert_eq!(describe(&rule_from(r#"{"pattern":"weekly","interval":1,"daysOfWeek":[1,3,5],"endType":"never"}"#)), "Weekly on Mon, Wed, Fri");
    assert_eq!(describe(&rule_from(r#"{"pattern":"monthly","interval":2,"endType":"never"}"#)), "Every 2 months");
}
