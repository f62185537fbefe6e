//! CLI error handling utilities
//!
//! CLI-specific error type with user-facing messages and exit codes.

use std::fmt;

/// CLI exit codes for different error categories
pub mod exit_codes {
    pub const GENERAL_ERROR: i32 = 1;
    pub const TABLE_NOT_FOUND: i32 = 3;
    pub const TABLE_EXISTS: i32 = 4;
    pub const VALIDATION_ERROR: i32 = 5;
    pub const CONNECTION_ERROR: i32 = 6;
    pub const IO_ERROR: i32 = 7;
    pub const STORE_ERROR: i32 = 8;
    pub const WRITE_FAILED: i32 = 9;
    pub const INTERNAL_ERROR: i32 = 99;
}

#[derive(Debug)]
pub enum CliError {
    TableNotFound(String),
    TableExists(String),
    Validation(String),
    Io(String),
    Connection(String),
    Store(String),
    WriteFailed(String),
    Internal(String),
}

impl CliError {
    /// Get the appropriate exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::TableNotFound(_) => exit_codes::TABLE_NOT_FOUND,
            CliError::TableExists(_) => exit_codes::TABLE_EXISTS,
            CliError::Validation(_) => exit_codes::VALIDATION_ERROR,
            CliError::Io(_) => exit_codes::IO_ERROR,
            CliError::Connection(_) => exit_codes::CONNECTION_ERROR,
            CliError::Store(_) => exit_codes::STORE_ERROR,
            CliError::WriteFailed(_) => exit_codes::WRITE_FAILED,
            CliError::Internal(_) => exit_codes::INTERNAL_ERROR,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::TableNotFound(name) => write!(
                f,
                "Table not found: {}. Enable create_if_missing or create it first.",
                name
            ),
            CliError::TableExists(name) => write!(f, "Table already exists: {}", name),
            CliError::Validation(msg) => write!(f, "Validation error: {}", msg),
            CliError::Io(msg) => write!(f, "IO error: {}", msg),
            CliError::Connection(msg) => write!(f, "Connection error: {}", msg),
            CliError::Store(msg) => write!(f, "Store error: {}", msg),
            CliError::WriteFailed(msg) => write!(f, "Write failed: {}", msg),
            CliError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<region_bench::Error> for CliError {
    fn from(err: region_bench::Error) -> Self {
        use region_bench::Error;
        match err {
            Error::TableNotFound(name) => CliError::TableNotFound(name),
            Error::TableExists(name) => CliError::TableExists(name),
            Error::InvalidArgument(msg) | Error::Config(msg) | Error::Json(msg) => {
                CliError::Validation(msg)
            }
            Error::Io(msg) => CliError::Io(msg),
            Error::ConnectionFailure(msg) => CliError::Connection(msg),
            err @ Error::WriteFailure { .. } => CliError::WriteFailed(err.to_string()),
            err @ Error::TableState { .. } => CliError::Store(err.to_string()),
            Error::Generic(msg) => CliError::Internal(msg),
        }
    }
}

impl From<&str> for CliError {
    fn from(msg: &str) -> Self {
        CliError::Validation(msg.to_string())
    }
}

impl From<String> for CliError {
    fn from(msg: String) -> Self {
        CliError::Validation(msg)
    }
}

/// Exit code for an error returned by a command
pub fn exit_code_for(error: &(dyn std::error::Error + 'static)) -> i32 {
    match error.downcast_ref::<CliError>() {
        Some(cli_error) => cli_error.exit_code(),
        None => exit_codes::GENERAL_ERROR,
    }
}
