use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SitecalError;
use crate::recurrence::Anchor;

/// Calendar event (site meeting, delivery window, inspection)
///
/// Start and end keep the UTC offset they were entered with, so a repeating
/// 7:00 meeting stays at 7:00 local time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Option<i64>,
    pub uuid: String,
    pub title: String,
    pub location: Option<String>,
    pub project_id: Option<i64>,
    pub start_at: DateTime<FixedOffset>,
    pub end_at: DateTime<FixedOffset>,
    /// Recurrence rule JSON, stored as entered
    pub recurrence: Option<String>,
    pub created_ts: i64,
    pub modified_ts: i64,
}

impl Event {
    /// Create a new event; the end must not be before the start
    pub fn new(
        title: String,
        start_at: DateTime<FixedOffset>,
        end_at: DateTime<FixedOffset>,
    ) -> Result<Self, SitecalError> {
        if end_at < start_at {
            return Err(SitecalError::EventEndsBeforeStart);
        }
        let now = Utc::now().timestamp();
        Ok(Self {
            id: None,
            uuid: uuid::Uuid::new_v4().to_string(),
            title,
            location: None,
            project_id: None,
            start_at,
            end_at,
            recurrence: None,
            created_ts: now,
            modified_ts: now,
        })
    }

    pub fn duration(&self) -> Duration {
        self.end_at - self.start_at
    }
}

impl Anchor for Event {
    fn anchor_id(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => self.uuid.clone(),
        }
    }

    fn anchor_start(&self) -> Option<DateTime<FixedOffset>> {
        Some(self.start_at)
    }

    fn anchor_duration(&self) -> Option<Duration> {
        Some(self.duration())
    }

    fn retimed(&self, start: DateTime<FixedOffset>, end: Option<DateTime<FixedOffset>>) -> Self {
        Self {
            start_at: start,
            end_at: end.or_else(|| start.checked_add_signed(self.duration())).unwrap_or(start),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_end_before_start_rejected() {
        let result = Event::new("Toolbox talk".to_string(), at("2024-01-01T09:00:00Z"), at("2024-01-01T08:00:00Z"));
        assert!(matches!(result, Err(SitecalError::EventEndsBeforeStart)));
        assert_eq!(SitecalError::EventEndsBeforeStart.to_string(), "Event must not end before it starts");
    }

    #[test]
    fn test_zero_length_event_allowed() {
        let event = Event::new("Milestone".to_string(), at("2024-01-01T09:00:00Z"), at("2024-01-01T09:00:00Z")).unwrap();
        assert_eq!(event.duration(), Duration::zero());
    }

    #[test]
    fn test_retimed_keeps_duration() {
        let event = Event::new("Concrete delivery".to_string(), at("2024-01-01T07:00:00+10:00"), at("2024-01-01T09:30:00+10:00")).unwrap();
        let moved = event.retimed(at("2024-01-08T07:00:00+10:00"), None);
        assert_eq!(moved.end_at, at("2024-01-08T09:30:00+10:00"));
        assert_eq!(moved.title, "Concrete delivery");
        assert_eq!(moved.uuid, event.uuid);
    }
}
