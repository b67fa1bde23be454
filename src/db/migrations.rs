use rusqlite::{Connection, Result};
use std::collections::HashMap;

/// Current database schema version
const CURRENT_VERSION: u32 = 2;

type Migration = fn(&rusqlite::Transaction) -> Result<(), rusqlite::Error>;

/// Migration system for managing database schema versions
pub struct MigrationManager;

impl MigrationManager {
    /// Create the schema_version table and apply every pending migration
    pub fn initialize(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            [],
        )?;

        let current_version = Self::get_version(conn).unwrap_or(0);

        for version in (current_version + 1)..=CURRENT_VERSION {
            Self::apply_migration(conn, version)?;
        }

        Ok(())
    }

    /// Apply a specific migration by version number
    fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
        let migrations = get_migrations();
        let Some(migration) = migrations.get(&version) else {
            return Err(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
                Some(format!("No migration found for version {}", version)),
            ));
        };

        let tx = conn.unchecked_transaction()?;
        migration(&tx)?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )?;
        tx.commit()?;

        log::debug!("Applied schema migration v{}", version);
        Ok(())
    }

    /// Get the current schema version
    pub fn get_version(conn: &Connection) -> Result<u32> {
        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
    }
}

/// Get all migrations indexed by version
fn get_migrations() -> HashMap<u32, Migration> {
    let mut migrations: HashMap<u32, Migration> = HashMap::new();
    migrations.insert(1, migration_v1);
    migrations.insert(2, migration_v2);
    migrations
}

/// Migration v1: projects and tasks
fn migration_v1(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "CREATE TABLE projects (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            is_archived INTEGER NOT NULL DEFAULT 0,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;

    // due_date is YYYY-MM-DD; recurrence is the rule's JSON encoding
    tx.execute(
        "CREATE TABLE tasks (
            id INTEGER PRIMARY KEY,
            uuid TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL,
            status TEXT NOT NULL CHECK(status IN ('open','completed')),
            project_id INTEGER NULL REFERENCES projects(id),
            due_date TEXT NULL,
            recurrence TEXT NULL,
            parent_task_id INTEGER NULL REFERENCES tasks(id) ON DELETE SET NULL,
            is_recurring_instance INTEGER NOT NULL DEFAULT 0,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;
    tx.execute("CREATE INDEX idx_tasks_project_id ON tasks(project_id)", [])?;
    tx.execute("CREATE INDEX idx_tasks_status ON tasks(status)", [])?;
    tx.execute("CREATE INDEX idx_tasks_due_date ON tasks(due_date)", [])?;
    tx.execute("CREATE INDEX idx_tasks_parent ON tasks(parent_task_id)", [])?;

    Ok(())
}

/// Migration v2: calendar events
fn migration_v2(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    // start_at/end_at are RFC 3339 with the offset they were entered in
    tx.execute(
        "CREATE TABLE events (
            id INTEGER PRIMARY KEY,
            uuid TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            location TEXT NULL,
            project_id INTEGER NULL REFERENCES projects(id),
            start_at TEXT NOT NULL,
            end_at TEXT NOT NULL,
            recurrence TEXT NULL,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;
    tx.execute("CREATE INDEX idx_events_start_at ON events(start_at)", [])?;
    tx.execute("CREATE INDEX idx_events_project_id ON events(project_id)", [])?;

    Ok(())
}
