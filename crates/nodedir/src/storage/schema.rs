//! `SQLite` schema definitions for the slot database.

/// SQL statement to create the slots table.
pub const CREATE_SLOTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS slots (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
///
/// Kept apart from `slots` so that clearing every slot never loses the
/// schema version.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Upsert a slot value together with its write timestamp.
pub const UPSERT_SLOT: &str = r"
INSERT INTO slots (key, value, updated_at) VALUES (?1, ?2, ?3)
ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
";

/// Byte size of every slot, keys included.
pub const TOTAL_SLOT_BYTES: &str = r"
SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0) FROM slots
";

/// Byte size of a single slot, key included.
pub const SLOT_BYTES: &str = r"
SELECT LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB)) FROM slots WHERE key = ?1
";

/// Base schema creation statements, in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_SLOTS_TABLE, CREATE_METADATA_TABLE];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.trim().is_empty());
        }
    }

    #[test]
    fn test_slots_table_has_primary_key() {
        assert!(CREATE_SLOTS_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_SLOTS_TABLE.contains("value TEXT NOT NULL"));
        assert!(CREATE_SLOTS_TABLE.contains("updated_at TEXT"));
    }

    #[test]
    fn test_upsert_touches_timestamp() {
        assert!(UPSERT_SLOT.contains("updated_at = excluded.updated_at"));
    }
}
