#![allow(dead_code)]

use std::fs;
use std::sync::{Mutex, MutexGuard, OnceLock};

use assert_cmd::Command;
use tempfile::TempDir;

pub fn lock_test_env() -> MutexGuard<'static, ()> {
    static TEST_ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    TEST_ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner())
}

/// Temporary HOME with an rc file pointing the database into it
pub fn setup_test_env() -> (TempDir, MutexGuard<'static, ()>) {
    setup_test_env_with("")
}

/// Like [`setup_test_env`], with extra rc lines appended
pub fn setup_test_env_with(extra_rc: &str) -> (TempDir, MutexGuard<'static, ()>) {
    let guard = lock_test_env();
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let config_dir = temp_dir.path().join(".sitecal");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("rc"),
        format!("data.location={}\n{}", db_path.display(), extra_rc),
    )
    .unwrap();
    (temp_dir, guard)
}

/// sitecal command running against the temporary HOME
pub fn new_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sitecal").unwrap();
    cmd.env("HOME", temp_dir.path());
    cmd.env("TZ", "UTC");
    cmd
}

/// Open the test database directly
pub fn open_db(temp_dir: &TempDir) -> rusqlite::Connection {
    sitecal::db::DbConnection::connect_at(&temp_dir.path().join("test.db")).unwrap()
}
