//! Table error types
//!
//! Error codes:
//! - CATTERY_VALIDATION_FAILED (client error)
//! - CATTERY_MALFORMED_ROW (server error, never auto-repaired)
//! - CATTERY_STORAGE_READ_FAILED (server error)
//! - CATTERY_STORAGE_WRITE_FAILED (server error)
//! - CATTERY_IDS_EXHAUSTED (server error)
//!
//! "Not found" is deliberately absent: lookups report it as `None` or a
//! removed count of zero.

use std::fmt;
use std::io;

use thiserror::Error;

/// Table-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableErrorCode {
    /// A required field was missing or blank
    ValidationFailed,
    /// A persisted row could not be decoded
    MalformedRow,
    /// Reading the table file failed
    StorageReadFailed,
    /// Writing the table file failed
    StorageWriteFailed,
    /// The id counter has passed `u64::MAX`
    IdsExhausted,
}

impl TableErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            TableErrorCode::ValidationFailed => "CATTERY_VALIDATION_FAILED",
            TableErrorCode::MalformedRow => "CATTERY_MALFORMED_ROW",
            TableErrorCode::StorageReadFailed => "CATTERY_STORAGE_READ_FAILED",
            TableErrorCode::StorageWriteFailed => "CATTERY_STORAGE_WRITE_FAILED",
            TableErrorCode::IdsExhausted => "CATTERY_IDS_EXHAUSTED",
        }
    }

    /// Returns whether the caller (not the server) is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, TableErrorCode::ValidationFailed)
    }
}

impl fmt::Display for TableErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by the record codec and the record store.
#[derive(Debug, Error)]
pub enum TableError {
    /// A required attribute was absent or empty after trimming
    #[error("field '{field}' is required and must not be empty")]
    Validation { field: &'static str },

    /// A persisted row is corrupt
    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// I/O failure while reading the table
    #[error("{message}: {source}")]
    StorageRead {
        message: String,
        #[source]
        source: io::Error,
    },

    /// I/O failure while writing the table
    #[error("{message}: {source}")]
    StorageWrite {
        message: String,
        #[source]
        source: io::Error,
    },

    /// Every id up to `u64::MAX` has been assigned
    #[error("no record ids left to assign")]
    IdsExhausted,
}

impl TableError {
    /// Create a validation error for the named field
    pub fn validation(field: &'static str) -> Self {
        TableError::Validation { field }
    }

    /// Create a malformed row error at a 1-based line
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        TableError::MalformedRow {
            line,
            reason: reason.into(),
        }
    }

    /// Create a storage read error
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        TableError::StorageRead {
            message: message.into(),
            source,
        }
    }

    /// Create a storage write error
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        TableError::StorageWrite {
            message: message.into(),
            source,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> TableErrorCode {
        match self {
            TableError::Validation { .. } => TableErrorCode::ValidationFailed,
            TableError::MalformedRow { .. } => TableErrorCode::MalformedRow,
            TableError::StorageRead { .. } => TableErrorCode::StorageReadFailed,
            TableError::StorageWrite { .. } => TableErrorCode::StorageWriteFailed,
            TableError::IdsExhausted => TableErrorCode::IdsExhausted,
        }
    }
}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;
