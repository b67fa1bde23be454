use serde::{Deserialize, Serialize};

/// Construction project grouping tasks and events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Option<i64>,
    pub name: String,
    pub is_archived: bool,
    pub created_ts: i64,
    pub modified_ts: i64,
}

impl Project {
    pub fn new(name: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: None,
            name,
            is_archived: false,
            created_ts: now,
            modified_ts: now,
        }
    }
}
