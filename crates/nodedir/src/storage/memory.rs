//! In-memory slot backend.

use std::collections::BTreeMap;

use tracing::trace;

use super::{check_quota, slot_size, KeyValueStore};
use crate::error::Result;

/// Slot backend holding everything in a sorted map.
///
/// Nothing survives the process. Used by tests and by `--dry-run` style
/// flows that must not touch the real database.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slots: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryBackend {
    /// Create an empty backend without a quota.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty backend that rejects writes beyond `quota` bytes.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            slots: BTreeMap::new(),
            quota: Some(quota),
        }
    }

    /// Copy every slot and the quota of another backend.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` cannot be read.
    pub fn snapshot(source: &dyn KeyValueStore) -> Result<Self> {
        let mut slots = BTreeMap::new();
        for key in source.keys()? {
            if let Some(value) = source.get(&key)? {
                slots.insert(key, value);
            }
        }
        Ok(Self {
            slots,
            quota: source.quota(),
        })
    }

    fn total(&self) -> usize {
        self.slots.iter().map(|(k, v)| slot_size(k, v)).sum()
    }
}

impl KeyValueStore for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let existing = self.slots.get(key).map_or(0, |v| slot_size(key, v));
        check_quota(self.quota, self.total(), existing, slot_size(key, value))?;
        trace!(key, bytes = value.len(), "Writing memory slot");
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.slots.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.slots.clear();
        Ok(())
    }

    fn used_bytes(&self) -> Result<usize> {
        Ok(self.total())
    }

    fn quota(&self) -> Option<usize> {
        self.quota
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.slots.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_set_get_remove() {
        let mut backend = MemoryBackend::new();
        assert_eq!(backend.get("k").unwrap(), None);

        backend.set("k", "v").unwrap();
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("v"));

        backend.remove("k").unwrap();
        assert_eq!(backend.get("k").unwrap(), None);
        backend.remove("k").unwrap();
    }

    #[test]
    fn test_clear() {
        let mut backend = MemoryBackend::new();
        backend.set("a", "1").unwrap();
        backend.set("b", "2").unwrap();
        backend.clear().unwrap();
        assert!(backend.keys().unwrap().is_empty());
        assert_eq!(backend.used_bytes().unwrap(), 0);
    }

    #[test]
    fn test_quota_rejects_and_keeps_old_value() {
        let mut backend = MemoryBackend::with_quota(8);
        backend.set("k", "1234").unwrap();

        let err = backend.set("k", "123456789").unwrap_err();
        assert!(matches!(err, Error::QuotaExceeded { .. }));
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("1234"));
    }

    #[test]
    fn test_quota_allows_shrinking_rewrite() {
        let mut backend = MemoryBackend::with_quota(8);
        backend.set("k", "1234567").unwrap();
        backend.set("k", "12").unwrap();
        assert_eq!(backend.used_bytes().unwrap(), 3);
    }

    #[test]
    fn test_keys_sorted() {
        let mut backend = MemoryBackend::new();
        backend.set("theme", "dark").unwrap();
        backend.set("alpha", "x").unwrap();
        assert_eq!(backend.keys().unwrap(), vec!["alpha", "theme"]);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut source = MemoryBackend::with_quota(50);
        source.set("theme", "light").unwrap();

        let mut copy = MemoryBackend::snapshot(&source).unwrap();
        assert_eq!(copy.get("theme").unwrap().as_deref(), Some("light"));
        assert_eq!(copy.quota(), Some(50));

        copy.set("theme", "dark").unwrap();
        assert_eq!(source.get("theme").unwrap().as_deref(), Some("light"));
    }
}
