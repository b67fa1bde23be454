use rusqlite::{Connection, OptionalExtension, Row};
use crate::error::SitecalError;
use crate::models::Project;
use anyhow::{Context, Result};

const PROJECT_COLUMNS: &str = "id, name, is_archived, created_ts, modified_ts";

/// Project repository for database operations
///
/// # Example
///
/// ```no_run
/// use sitecal::db::DbConnection;
/// use sitecal::repo::ProjectRepo;
///
/// let conn = DbConnection::connect_in_memory().unwrap();
/// let project = ProjectRepo::create(&conn, "harbour-st-fitout").unwrap();
/// ```
pub struct ProjectRepo;

impl ProjectRepo {
    /// Create a new project; names are unique
    pub fn create(conn: &Connection, name: &str) -> Result<Project> {
        if Self::get_by_name(conn, name)?.is_some() {
            return Err(SitecalError::ProjectExists(name.to_string()).into());
        }

        let project = Project::new(name.to_string());
        conn.execute(
            "INSERT INTO projects (name, is_archived, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                project.name,
                project.is_archived,
                project.created_ts,
                project.modified_ts
            ],
        )
        .with_context(|| format!("Failed to create project: {}", name))?;

        Ok(Project {
            id: Some(conn.last_insert_rowid()),
            ..project
        })
    }

    /// Get project by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Project>> {
        let mut stmt = conn.prepare(&format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS))?;
        let project = stmt.query_row([id], row_to_project).optional()?;
        Ok(project)
    }

    /// Get project by name
    pub fn get_by_name(conn: &Connection, name: &str) -> Result<Option<Project>> {
        let mut stmt = conn.prepare(&format!("SELECT {} FROM projects WHERE name = ?1", PROJECT_COLUMNS))?;
        let project = stmt.query_row([name], row_to_project).optional()?;
        Ok(project)
    }

    /// Id of the named project, or [`SitecalError::ProjectNotFound`]
    pub fn resolve_id(conn: &Connection, name: &str) -> Result<i64> {
        Self::get_by_name(conn, name)?
            .and_then(|p| p.id)
            .ok_or_else(|| SitecalError::ProjectNotFound(name.to_string()).into())
    }

    /// List projects by name (archived ones only when asked)
    pub fn list(conn: &Connection, include_archived: bool) -> Result<Vec<Project>> {
        let query = if include_archived {
            format!("SELECT {} FROM projects ORDER BY name", PROJECT_COLUMNS)
        } else {
            format!("SELECT {} FROM projects WHERE is_archived = 0 ORDER BY name", PROJECT_COLUMNS)
        };

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map([], row_to_project)?;

        let mut projects = Vec::new();
        for row in rows {
            projects.push(row?);
        }
        Ok(projects)
    }
}

fn row_to_project(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        is_archived: row.get::<_, i64>(2)? != 0,
        created_ts: row.get(3)?,
        modified_ts: row.get(4)?,
    })
}
