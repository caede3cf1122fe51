//! Error types for table binding operations

use thiserror::Error;

/// Errors that can occur while binding a table or issuing statements against it
///
/// A read that matches nothing is not an error; see [`crate::Fetched::NotFound`].
#[derive(Debug, Error)]
pub enum DalError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Statement error: {0}")]
    Statement(String),

    #[error("Arity mismatch: {columns} columns but {values} values")]
    ArityMismatch { columns: usize, values: usize },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DalError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn statement(msg: impl Into<String>) -> Self {
        Self::Statement(msg.into())
    }

    pub fn unknown_column(name: impl Into<String>) -> Self {
        Self::UnknownColumn(name.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn arity(columns: usize, values: usize) -> Self {
        Self::ArityMismatch { columns, values }
    }
}

pub type Result<T> = std::result::Result<T, DalError>;
