//! Schema versioning for the slot database.
//!
//! The base tables are created idempotently, then numbered migrations bring
//! an older file up to [`CURRENT_VERSION`]. Version 1 is the base layout.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::schema::SCHEMA_STATEMENTS;

/// The current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// Create the base tables and run any pending migrations.
///
/// # Errors
///
/// Returns an error if schema creation or migration fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let version = get_schema_version(conn)?;
    if version != CURRENT_VERSION {
        run_migrations(conn, version)?;
    }

    Ok(())
}

/// Read the schema version; 0 means a fresh database.
pub(crate) fn get_schema_version(conn: &Connection) -> Result<i32> {
    let result: std::result::Result<String, rusqlite::Error> = conn.query_row(
        "SELECT value FROM metadata WHERE key = ?1",
        [VERSION_KEY],
        |row| row.get(0),
    );

    match result {
        Ok(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

fn run_migrations(conn: &Connection, from_version: i32) -> Result<()> {
    if from_version > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema {from_version} is newer than supported {CURRENT_VERSION}"
            ),
        });
    }

    let mut current = from_version;
    while current < CURRENT_VERSION {
        current += 1;
        debug!(version = current, "Applying slot schema migration");
        run_migration(current)?;
        set_schema_version(conn, current)?;
    }

    info!(version = CURRENT_VERSION, "Slot schema is up to date");
    Ok(())
}

fn run_migration(version: i32) -> Result<()> {
    match version {
        // Version 1 is the base layout created by SCHEMA_STATEMENTS.
        1 => Ok(()),
        _ => Err(Error::DatabaseMigration {
            message: format!("unknown migration version: {version}"),
        }),
    }
}

#[cfg(test)]
fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names.iter().any(|n| n == column))
}
