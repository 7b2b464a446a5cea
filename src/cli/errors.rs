//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;
use std::path::Path;

use crate::table::TableError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file or value error
    ConfigError,
    /// I/O error
    IoError,
    /// Table file already exists
    AlreadyInitialized,
    /// Table could not be opened or written
    TableError,
    /// Server failed to start or crashed
    BootFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CATTERY_CLI_CONFIG_ERROR",
            Self::IoError => "CATTERY_CLI_IO_ERROR",
            Self::AlreadyInitialized => "CATTERY_CLI_ALREADY_INITIALIZED",
            Self::TableError => "CATTERY_CLI_TABLE_ERROR",
            Self::BootFailed => "CATTERY_CLI_BOOT_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Table file already present
    pub fn already_initialized(table_path: &Path) -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            format!("Table already exists: {}", table_path.display()),
        )
    }

    /// Boot failed
    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::config_error(format!("Invalid config JSON: {}", e))
    }
}

impl From<TableError> for CliError {
    fn from(e: TableError) -> Self {
        Self::new(CliErrorCode::TableError, format!("[{}] {}", e.code(), e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_has_code_and_message() {
        let err = CliError::config_error("port must be > 0");
        assert_eq!(err.to_string(), "CATTERY_CLI_CONFIG_ERROR: port must be > 0");
    }

    #[test]
    fn test_table_error_keeps_table_code() {
        let err = CliError::from(TableError::malformed(3, "invalid id 'x'"));
        assert_eq!(err.code(), &CliErrorCode::TableError);
        assert!(err.message().contains("CATTERY_MALFORMED_ROW"));
        assert!(err.message().contains("line 3"));
    }
}
