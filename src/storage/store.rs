//! Key-value store for durable notes and favorites outside the deal record.
//!
//! A single `kv` table in a `SQLite` file. Writes are last-write-wins.

use std::{fs, path::PathBuf};

use rusqlite::{Connection, OptionalExtension, params};

use super::Result;

/// Durable byte storage keyed by string.
pub trait Store {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// [`Store`] backed by a `SQLite` file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::with_connection(conn)
    }

    /// Returns the default store path: `~/.outreach/store.sqlite`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".outreach").join("store.sqlite"))
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value BLOB NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }
}

impl Store for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn missing_key_is_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("nope").unwrap(), None);
    }

    #[test]
    fn last_write_wins() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("favorites", b"[1]").unwrap();
        store.set("favorites", b"[1,2]").unwrap();

        assert_eq!(store.get("favorites").unwrap().unwrap(), b"[1,2]");
    }

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.sqlite");

        SqliteStore::open(&path)
            .unwrap()
            .set("note:abc", b"call after lunch")
            .unwrap();

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("note:abc").unwrap().unwrap(),
            b"call after lunch"
        );
    }
}
