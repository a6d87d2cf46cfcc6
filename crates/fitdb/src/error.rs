//! Error types for fitdb

use thiserror::Error;

/// Result type alias for fitdb operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for database operations
#[derive(Debug, Error)]
pub enum DbError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pool construction, acquisition or connectivity failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement rejected by the database (surfaced verbatim from the driver)
    #[error("Statement error: {0}")]
    Statement(#[from] tokio_postgres::Error),

    /// No provider exists for the requested engine tag
    #[error("Unsupported database engine: {0}")]
    UnsupportedEngine(String),

    /// Descriptor rejected before execution
    #[error("Validation error: {0}")]
    Validation(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl DbError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is a connection error
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// SQLSTATE code reported by the server, if this is a statement error carrying one.
    ///
    /// The error itself is left untouched; callers decide what a code means for them.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Statement(err) => err.as_db_error().map(|db| db.code().code()),
            _ => None,
        }
    }
}

impl From<deadpool_postgres::PoolError> for DbError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Connection(err.to_string())
    }
}
