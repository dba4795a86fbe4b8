//! Error types for nodedir.
//!
//! This module defines all error types used throughout the nodedir crate.
//! Row-level import problems (skipped rows, sync failures) are not errors;
//! they are recorded in the import outcome log instead.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for nodedir operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Directory Errors ===
    /// No participant carries the requested identifier.
    #[error("identity node not found: {id}")]
    NotFound {
        /// The identifier that was looked up.
        id: String,
    },

    /// A durable write was rejected by the slot backend.
    #[error("persistence failed for slot '{slot}': {source}")]
    PersistenceFailure {
        /// The slot that could not be written.
        slot: String,
        /// The backend error.
        #[source]
        source: Box<Error>,
    },

    /// The slot backend refused a write because it would exceed its quota.
    #[error("storage quota exceeded: {needed} bytes needed, {quota} bytes available")]
    QuotaExceeded {
        /// Total bytes the backend would hold after the write.
        needed: usize,
        /// Configured quota in bytes.
        quota: usize,
    },

    /// An uploaded spreadsheet could not be read.
    #[error("parsing failed: {message}")]
    ParseFailure {
        /// Description of what went wrong.
        message: String,
    },

    /// User supplied input failed validation.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// Description of the validation failure.
        message: String,
    },

    /// The admin access code did not match.
    #[error("access denied: credentials invalid")]
    AccessDenied,

    /// An import operation was requested in the wrong ingestor state.
    #[error("import not possible: {message}")]
    ImportState {
        /// Description of the state conflict.
        message: String,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for nodedir operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a not-found error for the given identifier.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Wrap a backend error as a failed durable write to `slot`.
    #[must_use]
    pub fn persistence(slot: impl Into<String>, source: Error) -> Self {
        Self::PersistenceFailure {
            slot: slot.into(),
            source: Box::new(source),
        }
    }

    /// Create a spreadsheet parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseFailure {
            message: message.into(),
        }
    }

    /// Create a field-level validation error.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create an ingestor state error.
    #[must_use]
    pub fn import_state(message: impl Into<String>) -> Self {
        Self::ImportState {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error reports a missing participant.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error reports a rejected durable write.
    #[must_use]
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, Self::PersistenceFailure { .. })
    }

    /// Check if this error is a validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("AB12C");
        assert_eq!(err.to_string(), "identity node not found: AB12C");
        assert!(err.is_not_found());
        assert!(!err.is_persistence_failure());
    }

    #[test]
    fn test_persistence_failure_wraps_source() {
        let err = Error::persistence(
            "leaders_summit_db",
            Error::QuotaExceeded {
                needed: 10,
                quota: 5,
            },
        );
        assert!(err.is_persistence_failure());
        let msg = err.to_string();
        assert!(msg.contains("leaders_summit_db"));
        assert!(msg.contains("quota exceeded"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_validation_display() {
        let err = Error::validation("name", "required");
        assert_eq!(err.to_string(), "invalid name: required");
        assert!(err.is_validation());
    }

    #[test]
    fn test_parse_display() {
        let err = Error::parse("file is empty");
        assert_eq!(err.to_string(), "parsing failed: file is empty");
    }

    #[test]
    fn test_access_denied_display() {
        assert_eq!(
            Error::AccessDenied.to_string(),
            "access denied: credentials invalid"
        );
    }

    #[test]
    fn test_import_state_display() {
        let err = Error::import_state("no file loaded");
        assert!(err.to_string().contains("no file loaded"));
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "access_code must not be empty".to_string(),
        };
        assert!(err.to_string().contains("access_code"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
