use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row};
use crate::error::SitecalError;
use crate::models::{Task, TaskStatus};
use crate::recurrence::{next_due_for_stored, RecurrenceRule};
use anyhow::{Context, Result};

const TASK_COLUMNS: &str = "id, uuid, description, status, project_id, due_date, recurrence,
                            parent_task_id, is_recurring_instance, created_ts, modified_ts";

/// Task repository for database operations
pub struct TaskRepo;

impl TaskRepo {
    /// Create a new task with full field support
    pub fn create_full(
        conn: &Connection,
        description: &str,
        project_id: Option<i64>,
        due_date: Option<NaiveDate>,
        recurrence: Option<&RecurrenceRule>,
    ) -> Result<Task> {
        let mut task = Task::new(description.to_string());
        task.project_id = project_id;
        task.due_date = due_date;
        task.recurrence = recurrence
            .map(|rule| rule.to_json().map_err(SitecalError::from))
            .transpose()?;

        Self::insert(conn, task)
    }

    /// Create a plain task
    pub fn create(conn: &Connection, description: &str, project_id: Option<i64>) -> Result<Task> {
        Self::create_full(conn, description, project_id, None, None)
    }

    fn insert(conn: &Connection, task: Task) -> Result<Task> {
        conn.execute(
            "INSERT INTO tasks (uuid, description, status, project_id, due_date, recurrence,
                    parent_task_id, is_recurring_instance, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                task.uuid,
                task.description,
                task.status.as_str(),
                task.project_id,
                task.due_date.map(format_date),
                task.recurrence,
                task.parent_task_id,
                task.is_recurring_instance,
                task.created_ts,
                task.modified_ts
            ],
        )
        .with_context(|| format!("Failed to create task: {}", task.description))?;

        Ok(Task {
            id: Some(conn.last_insert_rowid()),
            ..task
        })
    }

    /// Get task by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Task>> {
        let mut stmt = conn.prepare(&format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS))?;
        let task = stmt.query_row([id], row_to_task).optional()?;
        Ok(task)
    }

    /// List all tasks
    pub fn list_all(conn: &Connection) -> Result<Vec<Task>> {
        Self::query(conn, &format!("SELECT {} FROM tasks ORDER BY id", TASK_COLUMNS), [])
    }

    /// Open tasks with a due date, the ones the calendar shows
    pub fn list_open_dated(conn: &Connection) -> Result<Vec<Task>> {
        Self::query(
            conn,
            &format!(
                "SELECT {} FROM tasks WHERE status = 'open' AND due_date IS NOT NULL ORDER BY due_date, id",
                TASK_COLUMNS
            ),
            [],
        )
    }

    /// Instances spawned from a recurring parent, oldest first
    pub fn list_instances(conn: &Connection, parent_id: i64) -> Result<Vec<Task>> {
        Self::query(
            conn,
            &format!("SELECT {} FROM tasks WHERE parent_task_id = ?1 ORDER BY id", TASK_COLUMNS),
            [parent_id],
        )
    }

    fn query<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Task>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, row_to_task)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    /// Mark a task completed
    ///
    /// Completing a recurring parent (a task with a rule that is not itself
    /// an instance) creates exactly one new open task due on the next
    /// occurrence, carrying the same rule and pointing back at the parent.
    /// The next occurrence is counted from the due date, or from `today` when
    /// the task has none. Completing an instance, a non-recurring task or an
    /// already completed task creates nothing.
    ///
    /// Returns the spawned instance, if any.
    pub fn complete(conn: &Connection, id: i64, today: NaiveDate) -> Result<Option<Task>> {
        let tx = conn.unchecked_transaction()?;

        let task = Self::get_by_id(&tx, id)?.ok_or(SitecalError::TaskNotFound(id))?;
        if task.status == TaskStatus::Completed {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();
        tx.execute(
            "UPDATE tasks SET status = ?1, modified_ts = ?2 WHERE id = ?3",
            rusqlite::params![TaskStatus::Completed.as_str(), now, id],
        )
        .with_context(|| format!("Failed to complete task {}", id))?;

        let spawned = if task.is_recurring_parent() {
            let base = task.due_date.unwrap_or(today);
            match next_due_for_stored(base, task.recurrence.as_deref()) {
                Some(next_due) => {
                    let mut instance = Task::new(task.description.clone());
                    instance.project_id = task.project_id;
                    instance.due_date = Some(next_due);
                    instance.recurrence = task.recurrence.clone();
                    instance.parent_task_id = Some(id);
                    instance.is_recurring_instance = true;
                    let instance = Self::insert(&tx, instance)?;
                    log::info!(
                        "Spawned task {} due {} from recurring task {}",
                        instance.id.unwrap_or_default(),
                        next_due,
                        id
                    );
                    Some(instance)
                }
                None => None,
            }
        } else {
            None
        };

        tx.commit()?;
        Ok(spawned)
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    let status: String = row.get(3)?;
    let due_date: Option<String> = row.get(5)?;
    let due_date = due_date
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
            })
        })
        .transpose()?;

    Ok(Task {
        id: Some(row.get(0)?),
        uuid: row.get(1)?,
        description: row.get(2)?,
        status: TaskStatus::parse(&status).unwrap_or(TaskStatus::Open),
        project_id: row.get(4)?,
        due_date,
        recurrence: row.get(6)?,
        parent_task_id: row.get(7)?,
        is_recurring_instance: row.get::<_, i64>(8)? != 0,
        created_ts: row.get(9)?,
        modified_ts: row.get(10)?,
    })
}
