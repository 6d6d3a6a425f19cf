use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::MarqueeError;

const SCHEMA_V1: &str = include_str!("../../../migrations/001_initial.sql");

/// A string-keyed slot store holding whole serialized blobs.
///
/// There are no partial updates: `set` replaces the value under a key.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, MarqueeError>;

    fn set(&self, key: &str, value: &str) -> Result<(), MarqueeError>;

    fn remove(&self, key: &str) -> Result<(), MarqueeError>;
}

/// SQLite-backed key/value storage.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, MarqueeError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, MarqueeError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }
}

impl KvStore for Storage {
    fn get(&self, key: &str) -> Result<Option<String>, MarqueeError> {
        self.conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), MarqueeError> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), MarqueeError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// Run schema migrations using `PRAGMA user_version` for version tracking.
fn run_migrations(conn: &Connection) -> Result<(), MarqueeError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key() {
        let db = Storage::open_memory().unwrap();
        assert_eq!(db.get("nope").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let db = Storage::open_memory().unwrap();
        db.set("k", "one").unwrap();
        db.set("k", "two").unwrap();
        assert_eq!(db.get("k").unwrap().as_deref(), Some("two"));

        db.remove("k").unwrap();
        assert_eq!(db.get("k").unwrap(), None);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marquee.db");

        {
            let db = Storage::open(&path).unwrap();
            db.set("movie-explorer:favorites:v1", r#"{"items":{}}"#)
                .unwrap();
        }

        let db = Storage::open(&path).unwrap();
        assert_eq!(
            db.get("movie-explorer:favorites:v1").unwrap().as_deref(),
            Some(r#"{"items":{}}"#)
        );
    }
}
