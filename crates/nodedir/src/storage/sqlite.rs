//! `SQLite` slot backend.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, trace};

use super::{check_quota, migrations, schema, slot_size, KeyValueStore};
use crate::error::{Error, Result};

/// Slot backend stored in a single `SQLite` file.
#[derive(Debug)]
pub struct SqliteBackend {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
    /// Byte quota for all slots combined.
    quota: Option<usize>,
}

impl SqliteBackend {
    /// Open or create the slot database at `path`.
    ///
    /// Creates missing parent directories and brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>, quota: Option<usize>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening slot database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Slot database ready at {}", path.display());
        Ok(Self { path, conn, quota })
    }

    /// Create an in-memory database, mainly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory(quota: Option<usize>) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
            quota,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When a slot was last written, as an RFC 3339 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn updated_at(&self, key: &str) -> Result<Option<String>> {
        let stamp: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT updated_at FROM slots WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(stamp.flatten())
    }

    fn slot_bytes(&self, key: &str) -> Result<usize> {
        let bytes: Option<i64> = self
            .conn
            .query_row(schema::SLOT_BYTES, [key], |row| row.get(0))
            .optional()?;
        Ok(bytes.map_or(0, |b| usize::try_from(b).unwrap_or(0)))
    }
}

impl KeyValueStore for SqliteBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.quota.is_some() {
            check_quota(
                self.quota,
                self.used_bytes()?,
                self.slot_bytes(key)?,
                slot_size(key, value),
            )?;
        }

        self.conn.execute(
            schema::UPSERT_SLOT,
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        trace!(key, bytes = value.len(), "Wrote slot");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM slots WHERE key = ?1", [key])?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let removed = self.conn.execute("DELETE FROM slots", [])?;
        debug!(removed, "Cleared all slots");
        Ok(())
    }

    fn used_bytes(&self) -> Result<usize> {
        let total: i64 = self
            .conn
            .query_row(schema::TOTAL_SLOT_BYTES, [], |row| row.get(0))?;
        Ok(usize::try_from(total).unwrap_or(0))
    }

    fn quota(&self) -> Option<usize> {
        self.quota
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM slots ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}
