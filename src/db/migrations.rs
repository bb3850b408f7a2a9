use std::path::{Path, PathBuf};
use rusqlite::Connection;

use crate::error::{AppError, AppResult};

pub const DB_FILE_NAME: &str = "shieldmate.db";

pub fn get_base_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".shieldmate")
}

pub fn get_db_path(base_dir: &Path) -> PathBuf {
    base_dir.join(DB_FILE_NAME)
}

/// Open (or create) the profile database under `base_dir` and bring its schema up to date.
pub fn init_db(base_dir: &Path) -> AppResult<Connection> {
    std::fs::create_dir_all(base_dir)?;

    let path = get_db_path(base_dir);
    let conn = Connection::open(&path)
        .map_err(|e| AppError::Database(format!("Failed to open database: {e}")))?;

    conn.execute_batch("PRAGMA journal_mode=WAL;")
        .map_err(|e| AppError::Database(format!("Failed to set pragmas: {e}")))?;

    prepare(&conn)?;
    log::debug!("Opened profile database at {:?}", path);
    Ok(conn)
}

pub fn init_memory_db() -> AppResult<Connection> {
    let conn = Connection::open_in_memory()
        .map_err(|e| AppError::Database(format!("Failed to open database: {e}")))?;
    prepare(&conn)?;
    Ok(conn)
}

fn prepare(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );"
    )
    .map_err(|e| AppError::Database(format!("Failed to create migrations table: {e}")))?;

    run_migrations(conn)
}

fn run_migrations(conn: &Connection) -> AppResult<()> {
    let migrations: Vec<(&str, &str)> = vec![
        ("001_initial", include_str!("../../migrations/001_initial.sql")),
    ];

    for (name, sql) in migrations {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                rusqlite::params![name],
                |row| row.get(0),
            )
            .unwrap_or(false);

        if !already_applied {
            conn.execute_batch(sql)
                .map_err(|e| AppError::Database(format!("Migration '{name}' failed: {e}")))?;

            conn.execute(
                "INSERT INTO _migrations (name) VALUES (?1)",
                rusqlite::params![name],
            )
            .map_err(|e| AppError::Database(format!("Failed to record migration '{name}': {e}")))?;

            log::info!("Applied migration: {}", name);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_db_is_reentrant() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("profile");
        drop(init_db(&base).unwrap());

        let conn = init_db(&base).unwrap();
        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM _migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, 1);
        assert!(get_db_path(&base).exists());
    }
}
