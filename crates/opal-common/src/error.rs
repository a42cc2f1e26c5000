//! Error types for OpalDB.

use thiserror::Error;

/// Result type alias using OpalError.
pub type Result<T> = std::result::Result<T, OpalError>;

/// Errors that can occur in OpalDB operations.
#[derive(Debug, Error)]
pub enum OpalError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Catalog errors
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Index not found: {table}.{column}")]
    IndexNotFound { table: String, column: String },

    #[error("Index already exists: {table}.{column}")]
    IndexAlreadyExists { table: String, column: String },

    // Constraint errors
    #[error("Column {0} cannot be NULL")]
    NullConstraintViolation(String),

    #[error("Column {column} has a uniqueness constraint, and value {value} already exists")]
    ConstraintViolation { column: String, value: String },

    // Value errors
    #[error("A value for column {column} of type {expected} cannot be attained from {value}")]
    TypeMismatch {
        column: String,
        expected: String,
        value: String,
    },

    #[error("Column {column} of type {expected} cannot hold the value {value}")]
    ValueOutOfRange {
        column: String,
        expected: String,
        value: String,
    },

    #[error("Record of {size} bytes exceeds the maximum record size of {max}")]
    RecordTooLarge { size: usize, max: usize },

    // Storage errors
    #[error("Page {page_num} corrupted: {reason}")]
    PageCorrupted { page_num: u32, reason: String },
}
