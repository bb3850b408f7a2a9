use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection};

use crate::error::{AppError, AppResult};
use crate::kv::KeyValueStore;

/// Key-value records in the `kv` table of the profile database.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let db = self.db.lock().map_err(|e| AppError::Database(e.to_string()))?;
        let result = db.query_row(
            "SELECT value FROM kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let db = self.db.lock().map_err(|e| AppError::Database(e.to_string()))?;
        db.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))",
            params![key, value],
        )
        .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let db = self.db.lock().map_err(|e| AppError::Database(e.to_string()))?;
        db.execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
