use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Write failed for {target}: {reason}")]
    WriteFailure { target: String, reason: String },

    #[error("Connection failure: {0}")]
    ConnectionFailure(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already exists: {0}")]
    TableExists(String),

    #[error("Table {table} is {state}")]
    TableState { table: String, state: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Generic error: {0}")]
    Generic(String),
}

impl Error {
    pub fn error_code(&self) -> i32 {
        match self {
            Error::Io(_) => -1,
            Error::InvalidArgument(_) => -2,
            Error::WriteFailure { .. } => -3,
            Error::ConnectionFailure(_) => -4,
            Error::TableNotFound(_) => -5,
            Error::TableExists(_) => -6,
            Error::TableState { .. } => -7,
            Error::Config(_) => -8,
            Error::Json(_) => -9,
            Error::Generic(_) => -99,
        }
    }

    /// Errors worth another attempt under a [`RetryPolicy`](crate::bench::RetryPolicy).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::WriteFailure { .. })
    }

    pub fn write_failure(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::WriteFailure {
            target: target.into(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}
