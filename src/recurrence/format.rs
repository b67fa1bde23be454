//! Human-readable rule descriptions

use std::fmt;

use chrono::Weekday;

use crate::recurrence::rule::{EndCondition, Pattern, RecurrenceRule};

/// Short phrase for the pattern and interval, e.g. "Weekly on Mon, Wed, Fri"
/// or "Every 2 months"
pub fn describe(rule: &RecurrenceRule) -> String {
    let n = rule.interval();
    match &rule.pattern {
        Pattern::Daily => every(n, "Daily", "days"),
        Pattern::Weekly { days } => {
            let base = every(n, "Weekly", "weeks");
            if days.is_empty() {
                base
            } else {
                let names: Vec<&str> = days.iter().map(|d| weekday_abbrev(*d)).collect();
                format!("{} on {}", base, names.join(", "))
            }
        }
        Pattern::Monthly => every(n, "Monthly", "months"),
        Pattern::Yearly => every(n, "Yearly", "years"),
        Pattern::Weekdays if n == 1 => "Every weekday".to_string(),
        Pattern::Weekdays => format!("Every {} days on weekdays", n),
    }
}

/// [`describe`] plus the end condition: "Daily, until Mar 1, 2024" or
/// "Monthly, 6 times"
pub fn summary(rule: &RecurrenceRule) -> String {
    let base = describe(rule);
    match rule.end {
        EndCondition::Never => base,
        EndCondition::Until(date) => format!("{}, until {}", base, date.format("%b %-d, %Y")),
        EndCondition::After(count) if count.get() == 1 => format!("{}, once", base),
        EndCondition::After(count) => format!("{}, {} times", base, count),
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe(self))
    }
}

fn every(n: u32, single: &str, unit: &str) -> String {
    if n == 1 {
        single.to_string()
    } else {
        format!("Every {} {}", n, unit)
    }
}

fn weekday_abbrev(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    }
}
