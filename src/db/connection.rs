use rusqlite::Connection;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use crate::config::Config;
use crate::db::migrations::MigrationManager;

/// Database connection manager
pub struct DbConnection;

impl DbConnection {
    /// Get the default database path
    pub fn default_path() -> Result<PathBuf> {
        Ok(Config::dir()?.join("sitecal.db"))
    }

    /// Get database path from configuration or default
    pub fn resolve_path(config: &Config) -> Result<PathBuf> {
        match &config.data_location {
            Some(path) => Ok(path.clone()),
            None => Self::default_path(),
        }
    }

    /// Connect to the configured database, creating it and parent directories if needed
    pub fn connect(config: &Config) -> Result<Connection> {
        let db_path = Self::resolve_path(config)?;
        Self::connect_at(&db_path)
    }

    /// Connect to a database file at an explicit path
    pub fn connect_at(db_path: &Path) -> Result<Connection> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;

        MigrationManager::initialize(&conn)
            .context("Failed to initialize database schema")?;

        Ok(conn)
    }

    /// Connect to an in-memory database (for testing)
    pub fn connect_in_memory() -> Result<Connection> {
        let conn = Connection::open_in_memory()
            .context("Failed to open in-memory database")?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;

        MigrationManager::initialize(&conn)
            .context("Failed to initialize database schema")?;

        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_path_prefers_config() {
        let config = Config {
            data_location: Some(PathBuf::from("/tmp/elsewhere.db")),
            ..Config::default()
        };
        assert_eq!(DbConnection::resolve_path(&config).unwrap(), PathBuf::from("/tmp/elsewhere.db"));
    }

    #[test]
    fn test_connect_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("site.db");

        let conn = DbConnection::connect_at(&db_path).unwrap();
        assert!(db_path.exists());
        assert_eq!(MigrationManager::get_version(&conn).unwrap(), 2);
    }

    #[test]
    fn test_connect_in_memory() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let version = MigrationManager::get_version(&conn).unwrap();
        assert_eq!(version, 2);
    }
}
