use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recurrence::Anchor;

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Open,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(TaskStatus::Open),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

/// Task model
///
/// A task with a `recurrence` rule that is not itself an instance is a
/// recurring parent. Completing it creates one instance row pointing back at
/// it through `parent_task_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Option<i64>,
    pub uuid: String,
    pub description: String,
    pub status: TaskStatus,
    pub project_id: Option<i64>,
    pub due_date: Option<NaiveDate>,
    /// Recurrence rule JSON, stored as entered
    pub recurrence: Option<String>,
    pub parent_task_id: Option<i64>,
    pub is_recurring_instance: bool,
    pub created_ts: i64,
    pub modified_ts: i64,
}

impl Task {
    /// Create a new task
    pub fn new(description: String) -> Self {
        let now = Utc::now().timestamp();
        Self {
            id: None,
            uuid: uuid::Uuid::new_v4().to_string(),
            description,
            status: TaskStatus::Open,
            project_id: None,
            due_date: None,
            recurrence: None,
            parent_task_id: None,
            is_recurring_instance: false,
            created_ts: now,
            modified_ts: now,
        }
    }

    pub fn has_recurrence(&self) -> bool {
        self.recurrence.as_deref().is_some_and(|r| !r.trim().is_empty())
    }

    /// Has a rule and was not spawned from another task
    pub fn is_recurring_parent(&self) -> bool {
        self.has_recurrence() && !self.is_recurring_instance
    }
}

/// Tasks anchor their series on the due date, at midnight UTC
impl Anchor for Task {
    fn anchor_id(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => self.uuid.clone(),
        }
    }

    fn anchor_start(&self) -> Option<DateTime<FixedOffset>> {
        self.due_date
            .map(|d| d.and_time(NaiveTime::MIN).and_utc().fixed_offset())
    }

    fn retimed(&self, start: DateTime<FixedOffset>, _end: Option<DateTime<FixedOffset>>) -> Self {
        Self {
            due_date: Some(start.date_naive()),
            ..self.clone()
        }
    }
}
