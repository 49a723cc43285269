//! SQLite-backed slot repository

use super::{content_hash, SlotStore};
use crate::error::{Error, PersistenceError, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// A stored slot row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRecord {
    pub key: String,
    pub value: String,
    /// sha256 of `value` at write time
    pub content_hash: String,
    pub updated_at: DateTime<Utc>,
}

impl SlotRecord {
    /// Whether the stored checksum still matches the value
    pub fn is_intact(&self) -> bool {
        content_hash(&self.value) == self.content_hash
    }
}

/// Database handle (single connection)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.connection();
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ============================================
    // Slot operations
    // ============================================

    /// Insert or replace a slot
    pub fn put_slot(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.connection();
        conn.execute(
            r#"
            INSERT INTO slots (key, value, content_hash, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                content_hash = excluded.content_hash,
                updated_at = excluded.updated_at
            "#,
            params![key, value, content_hash(value), Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Get a slot by key
    pub fn get_slot(&self, key: &str) -> Result<Option<SlotRecord>> {
        let conn = self.connection();
        conn.query_row(
            "SELECT key, value, content_hash, updated_at FROM slots WHERE key = ?",
            [key],
            Self::row_to_slot,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Delete a slot. Returns whether a row was removed.
    pub fn delete_slot(&self, key: &str) -> Result<bool> {
        let conn = self.connection();
        let removed = conn.execute("DELETE FROM slots WHERE key = ?", [key])?;
        Ok(removed > 0)
    }

    fn row_to_slot(row: &Row) -> rusqlite::Result<SlotRecord> {
        let updated_at: String = row.get(3)?;
        let updated_at = DateTime::parse_from_rfc3339(&updated_at)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
            })?;

        Ok(SlotRecord {
            key: row.get(0)?,
            value: row.get(1)?,
            content_hash: row.get(2)?,
            updated_at,
        })
    }
}

impl SlotStore for Database {
    fn read(&self, key: &str) -> std::result::Result<Option<String>, PersistenceError> {
        let record = self.get_slot(key).map_err(|e| PersistenceError::Read {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        match record {
            Some(record) if !record.is_intact() => Err(PersistenceError::Corrupt {
                key: key.to_string(),
                message: "checksum mismatch".to_string(),
            }),
            Some(record) => Ok(Some(record.value)),
            None => Ok(None),
        }
    }

    fn write(&self, key: &str, value: &str) -> std::result::Result<(), PersistenceError> {
        self.put_slot(key, value)
            .map_err(|e| PersistenceError::Write {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    fn remove(&self, key: &str) -> std::result::Result<(), PersistenceError> {
        self.delete_slot(key)
            .map(|_| ())
            .map_err(|e| PersistenceError::Write {
                key: key.to_string(),
                message: e.to_string(),
            })
    }
}
