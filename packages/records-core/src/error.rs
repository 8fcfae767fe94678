//! Database error types.

use thiserror::Error;

/// Database operation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DbError {
    /// Entity not found (or soft-deleted)
    #[error("{table} '{key}' not found")]
    NotFound { table: &'static str, key: String },

    /// Unique field already taken by a live entity
    #[error("{table} with {field} '{value}' already exists")]
    Conflict {
        table: &'static str,
        field: &'static str,
        value: String,
    },

    /// Field value rejected by validation
    #[error("Invalid value for '{field}': {message}")]
    Validation { field: &'static str, message: String },

    /// Request payload does not match the expected shape
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Login failed
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Operation timeout
    #[error("Operation timeout")]
    Timeout,

    /// Data corruption detected
    #[error("Data corruption detected: {0}")]
    DataCorruption(String),

    /// Disk full error during persistence
    #[error("Disk full: {0}")]
    DiskFull(String),

    /// I/O error during persistence
    #[error("I/O error: {0}")]
    IoError(String),

    /// Transient I/O error that may succeed on retry
    #[error("Transient I/O error: {0}")]
    TransientIoError(String),

    /// Password hashing failed
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// Runtime or persistence thread failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DbError {
    /// Shorthand for a not-found error keyed by guid or email.
    pub fn not_found(table: &'static str, key: impl ToString) -> Self {
        DbError::NotFound {
            table,
            key: key.to_string(),
        }
    }

    /// Shorthand for a validation error.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        DbError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::SerializationError(err.to_string())
    }
}
