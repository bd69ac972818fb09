use rusqlite::{params, Connection, OptionalExtension, Result};
use std::path::Path;

use crate::app_dirs::AppDirs;
use crate::profile::{ProfileKey, ProfileStore};

/// SQLite-backed profile store, one row per key
#[derive(Debug)]
pub struct SqliteProfileStore {
    conn: Connection,
}

impl SqliteProfileStore {
    /// Open the store at the default location under the state directory
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::profile_db_path()
            .unwrap_or_else(|| std::path::PathBuf::from("gallows_profile.db"));
        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS profile (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        Ok(Self { conn })
    }
}

impl ProfileStore for SqliteProfileStore {
    type Error = rusqlite::Error;

    fn get(&self, key: ProfileKey) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM profile WHERE key = ?1",
                [key.as_str()],
                |row| row.get(0),
            )
            .optional()
    }

    fn set(&mut self, key: ProfileKey, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO profile (key, value, updated_at)
            VALUES (?1, ?2, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            "#,
            params![key.as_str(), value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: ProfileKey) -> Result<()> {
        self.conn
            .execute("DELETE FROM profile WHERE key = ?1", [key.as_str()])?;
        Ok(())
    }
}
