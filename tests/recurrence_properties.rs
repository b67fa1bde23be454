// Property-based tests for occurrence expansion

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use proptest::prelude::*;
use sitecal::models::Event;
use sitecal::recurrence::{expand, expand_with_limit, EndCondition, Pattern, RecurrenceRule};

const BIG_LIMIT: usize = 20_000;

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2020..2027i32, 1..=12u32, 1..=31u32)
        .prop_filter_map("valid calendar date", |(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
}

fn arb_pattern() -> impl Strategy<Value = Pattern> {
    prop_oneof![
        Just(Pattern::Daily),
        proptest::collection::vec(0..7i64, 0..4).prop_map(|days| Pattern::weekly_on(&days)),
        Just(Pattern::Monthly),
        Just(Pattern::Yearly),
        Just(Pattern::Weekdays),
    ]
}

fn arb_end(anchor: NaiveDate) -> impl Strategy<Value = EndCondition> {
    prop_oneof![
        Just(EndCondition::Never),
        (0..800i64).prop_map(move |days| EndCondition::Until(anchor + Duration::days(days))),
        (1..40u32).prop_map(|n| EndCondition::After(std::num::NonZeroU32::new(n).unwrap_or(std::num::NonZeroU32::MIN))),
    ]
}

fn arb_rule(anchor: NaiveDate) -> impl Strategy<Value = RecurrenceRule> {
    (arb_pattern(), 1..4u32, arb_end(anchor), proptest::collection::vec(0..120i64, 0..6)).prop_map(
        move |(pattern, interval, end, exception_offsets)| {
            exception_offsets.into_iter().fold(
                RecurrenceRule::new(pattern).every(interval).ending(end),
                |rule, offset| rule.except(anchor + Duration::days(offset)),
            )
        },
    )
}

fn anchor_event(date: NaiveDate, hour: u32) -> Event {
    let time = NaiveTime::from_hms_opt(hour, 30, 0).unwrap_or(NaiveTime::MIN);
    let start: DateTime<FixedOffset> = date.and_time(time).and_utc().fixed_offset();
    let mut event = Event::new("Pour".to_string(), start, start + Duration::hours(2)).unwrap();
    event.id = Some(9);
    event
}

fn utc(date: NaiveDate) -> DateTime<FixedOffset> {
    date.and_time(NaiveTime::MIN).and_utc().fixed_offset()
}

fn case() -> impl Strategy<Value = (NaiveDate, u32, RecurrenceRule, i64, i64)> {
    arb_date().prop_flat_map(|anchor| {
        (Just(anchor), 0..24u32, arb_rule(anchor), -30..400i64, 0..400i64)
    })
}

proptest! {
    /// Every occurrence starts inside the requested window
    #[test]
    fn prop_window_containment((anchor, hour, rule, offset, length) in case()) {
        let event = anchor_event(anchor, hour);
        let ws = utc(anchor + Duration::days(offset));
        let we = ws + Duration::days(length);

        for occurrence in expand(&event, &rule, ws, we) {
            prop_assert!(occurrence.start >= ws && occurrence.start <= we);
        }
    }

    /// Same inputs, same output
    #[test]
    fn prop_deterministic((anchor, hour, rule, offset, length) in case()) {
        let event = anchor_event(anchor, hour);
        let ws = utc(anchor + Duration::days(offset));
        let we = ws + Duration::days(length);

        prop_assert_eq!(expand(&event, &rule, ws, we), expand(&event, &rule, ws, we));
    }

    /// Exceptions remove exactly the excepted days and nothing else
    #[test]
    fn prop_exceptions_only_remove_their_days((anchor, hour, rule, offset, length) in case()) {
        let event = anchor_event(anchor, hour);
        let ws = utc(anchor + Duration::days(offset));
        let we = ws + Duration::days(length);

        let mut without = rule.clone();
        without.exceptions.clear();

        let expected: Vec<_> = expand_with_limit(&event, &without, ws, we, BIG_LIMIT)
            .into_iter()
            .filter(|o| !rule.is_excepted(o.start.date_naive()))
            .collect();
        let actual = expand_with_limit(&event, &rule, ws, we, BIG_LIMIT);

        for occurrence in &actual {
            prop_assert!(!rule.is_excepted(occurrence.start.date_naive()));
        }
        prop_assert_eq!(actual, expected);
    }

    /// Starting the window late gives the same dates as walking from the anchor
    #[test]
    fn prop_late_window_matches_walk_from_anchor((anchor, hour, rule, offset, length) in case()) {
        let event = anchor_event(anchor, hour);
        let ws = utc(anchor + Duration::days(offset));
        let we = ws + Duration::days(length);

        let from_anchor: Vec<_> = expand_with_limit(&event, &rule, utc(anchor), we, BIG_LIMIT)
            .into_iter()
            .filter(|o| o.start >= ws)
            .collect();
        prop_assert_eq!(expand_with_limit(&event, &rule, ws, we, BIG_LIMIT), from_anchor);
    }

    /// An `after` rule without exceptions yields exactly its count
    #[test]
    fn prop_after_count_exact(anchor in arb_date(), pattern in arb_pattern(), interval in 1..4u32, n in 1..60u32) {
        let event = anchor_event(anchor, 8);
        let rule = RecurrenceRule::new(pattern).every(interval).ending(EndCondition::after(n).unwrap_or(EndCondition::Never));
        let far = utc(anchor + Duration::days(365 * 200));

        prop_assert_eq!(expand(&event, &rule, utc(anchor), far).len(), n as usize);
    }

    /// Nothing is generated once an `until` date has passed
    #[test]
    fn prop_exhausted_until_is_empty(anchor in arb_date(), pattern in arb_pattern(), until_days in 0..200i64, gap in 1..300i64) {
        let event = anchor_event(anchor, 8);
        let until = anchor + Duration::days(until_days);
        let rule = RecurrenceRule::new(pattern).ending(EndCondition::Until(until));
        let ws = utc(until + Duration::days(gap));

        prop_assert!(expand(&event, &rule, ws, ws + Duration::days(60)).is_empty());
    }
}
