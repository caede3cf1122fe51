//! sqlx-backed connections
//!
//! Each connection owns a current-thread tokio runtime and blocks on it for
//! every call, so callers use the crate from plain synchronous code. Do not
//! call into a connection from inside another tokio runtime.

pub mod mysql;
pub mod sqlite;

pub use mysql::MySqlConnection;
pub use sqlite::SqliteConnection;

use tokio::runtime::Runtime;

use crate::config::{Backend, DalConfig};
use crate::connection::{Connection, ConnectionState};
use crate::error::{DalError, Result};
use crate::sql::statement::Statement;

/// Open a connection for the backend named by the config's URL scheme
pub fn connect(config: DalConfig) -> Result<Box<dyn Connection>> {
    match config.backend()? {
        Backend::Sqlite => Ok(Box::new(SqliteConnection::open(config)?)),
        Backend::MySql => Ok(Box::new(MySqlConnection::open(config)?)),
    }
}

pub(crate) fn build_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| DalError::connection(format!("Could not start runtime: {}", e)))
}

pub(crate) fn log_statement(statement: &Statement) {
    tracing::debug!(
        kind = ?statement.kind,
        sql = %statement.render_inline(),
        "executing statement"
    );
}

/// Record a failed statement on the connection and turn it into a statement error
pub(crate) fn statement_failed(
    state: &ConnectionState,
    statement: &Statement,
    error: sqlx::Error,
) -> DalError {
    let message = error
        .as_database_error()
        .map(|db| db.message().to_string())
        .unwrap_or_else(|| error.to_string());

    tracing::warn!(
        sql = %statement.render_inline(),
        error = %message,
        "statement failed"
    );

    state.record_failure(message.clone());
    DalError::Statement(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_rejects_unknown_scheme() {
        let config = DalConfig::builder("postgres://localhost/shop").build();
        let err = connect(config).err().unwrap();
        assert!(matches!(err, DalError::Connection(_)));
    }

    #[test]
    fn test_connect_sqlite_memory() {
        let config = DalConfig::builder("sqlite::memory:").table_prefix("t_").build();
        let conn = connect(config).unwrap();
        assert_eq!(conn.table_prefix(), "t_");
        assert!(conn.list_columns("t_missing").unwrap().is_empty());
    }
}
