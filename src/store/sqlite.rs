use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use super::KvStorage;
use crate::error::StorageError;

/// Get the default database path (~/.local/share/stocktake/stocktake.db or platform equivalent)
pub fn default_db_path() -> Result<PathBuf, StorageError> {
    let data_dir = directories::ProjectDirs::from("", "", "stocktake")
        .ok_or(StorageError::NoDataDir)?
        .data_dir()
        .to_path_buf();

    Ok(data_dir.join("stocktake.db"))
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// SQLite-backed key-value storage. Open once per command, reuse across all operations.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        log::debug!("opened database {}", path.display());
        Ok(SqliteStorage { conn })
    }

    pub fn open_default() -> Result<Self, StorageError> {
        Self::open(&default_db_path()?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(SqliteStorage { conn })
    }
}

impl KvStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let updated_at = chrono::Utc::now().timestamp();

        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, updated_at],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_none() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        assert_eq!(storage.get("nope").unwrap(), None);
    }

    #[test]
    fn set_is_an_upsert() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage.set("k", "first").unwrap();
        storage.set("k", "second").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("second"));

        let rows: i64 = storage
            .conn
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
