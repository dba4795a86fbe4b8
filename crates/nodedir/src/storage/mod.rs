//! Slot storage for nodedir.
//!
//! The directory persists everything in named string slots. The
//! [`KeyValueStore`] trait is the seam between the record store and the
//! backing medium: [`MemoryBackend`] keeps slots in a map (tests, dry runs)
//! and [`SqliteBackend`] keeps them in a single-file `SQLite` table.
//!
//! Both backends can enforce a byte quota. A write that would push the total
//! size of all keys and values over the quota fails with
//! [`Error::QuotaExceeded`](crate::Error::QuotaExceeded) and leaves the
//! previous value in place.

mod memory;
pub mod migrations;
pub mod schema;
mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use crate::error::{Error, Result};

/// A durable string-keyed slot store.
pub trait KeyValueStore: Send + std::fmt::Debug {
    /// Read a slot. Returns `None` if the slot has never been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a slot, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QuotaExceeded`] if the write would exceed the quota,
    /// or a backend error if the write itself fails.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a slot. Removing a missing slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Remove every slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn clear(&mut self) -> Result<()>;

    /// Total bytes held by all keys and values.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn used_bytes(&self) -> Result<usize>;

    /// The configured quota in bytes, if any.
    fn quota(&self) -> Option<usize>;

    /// Names of all stored slots, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Size of a slot as counted against the quota.
#[must_use]
pub fn slot_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// Check that replacing a slot of `existing` bytes with one of `incoming`
/// bytes keeps the backend within `quota`.
///
/// # Errors
///
/// Returns [`Error::QuotaExceeded`] when the write would not fit.
pub fn check_quota(
    quota: Option<usize>,
    used: usize,
    existing: usize,
    incoming: usize,
) -> Result<()> {
    let Some(quota) = quota else {
        return Ok(());
    };
    let needed = used.saturating_sub(existing) + incoming;
    if needed > quota {
        return Err(Error::QuotaExceeded { needed, quota });
    }
    Ok(())
}

/// Usage summary of a slot backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of slots currently stored.
    pub slots: usize,
    /// Bytes held by keys and values.
    pub used_bytes: usize,
    /// Configured quota, if any.
    pub quota: Option<usize>,
}

impl StorageStats {
    /// Collect stats from any backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn collect(backend: &dyn KeyValueStore) -> Result<Self> {
        Ok(Self {
            slots: backend.keys()?.len(),
            used_bytes: backend.used_bytes()?,
            quota: backend.quota(),
        })
    }
}
