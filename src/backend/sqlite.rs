//! SQLite connection

use std::str::FromStr;
use std::time::Duration;

use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tokio::runtime::Runtime;

use crate::backend::{build_runtime, log_statement, statement_failed};
use crate::config::DalConfig;
use crate::connection::{Connection, ConnectionState, QueryOutcome};
use crate::error::{DalError, Result};
use crate::record::Record;
use crate::sql::dialect::Dialect;
use crate::sql::statement::{Statement, StatementKind};

/// Blocking SQLite connection backed by a sqlx pool
pub struct SqliteConnection {
    // Declared before `runtime` so the pool is released first.
    pool: SqlitePool,
    runtime: Runtime,
    config: DalConfig,
    state: ConnectionState,
}

impl SqliteConnection {
    /// Open the database at `config.database_url`
    ///
    /// In-memory databases are pinned to a single pooled connection that is
    /// never recycled, since every new connection would see an empty database.
    pub fn open(config: DalConfig) -> Result<Self> {
        let runtime = build_runtime()?;

        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| DalError::connection(format!("Invalid SQLite URL: {}", e)))?
            .create_if_missing(config.create_if_missing);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout);

        if config.is_in_memory() {
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
        }

        let pool = runtime
            .block_on(pool_options.connect_with(options))
            .map_err(|e| DalError::connection(format!("Database connection failed: {}", e)))?;

        tracing::info!(url = %config.database_url, "connected to SQLite");

        Ok(Self {
            pool,
            runtime,
            config,
            state: ConnectionState::new(),
        })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &DalConfig {
        &self.config
    }
}

impl Connection for SqliteConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn table_prefix(&self) -> &str {
        &self.config.table_prefix
    }

    fn execute(&self, statement: &Statement) -> Result<QueryOutcome> {
        log_statement(statement);

        let mut query = sqlx::query(&statement.sql);
        for param in &statement.params {
            query = query.bind(param.as_deref());
        }

        match self.runtime.block_on(query.execute(&self.pool)) {
            Ok(result) => {
                let outcome = QueryOutcome {
                    rows_affected: result.rows_affected(),
                    last_insert_id: (statement.kind == StatementKind::Insert)
                        .then(|| result.last_insert_rowid()),
                };
                self.state.record_success(outcome);
                Ok(outcome)
            }
            Err(e) => Err(statement_failed(&self.state, statement, e)),
        }
    }

    fn fetch_all(&self, statement: &Statement) -> Result<Vec<Record>> {
        log_statement(statement);

        let mut query = sqlx::query(&statement.sql);
        for param in &statement.params {
            query = query.bind(param.as_deref());
        }

        match self.runtime.block_on(query.fetch_all(&self.pool)) {
            Ok(rows) => {
                self.state.record_success(QueryOutcome {
                    rows_affected: rows.len() as u64,
                    last_insert_id: None,
                });
                Ok(rows.iter().map(decode_row).collect())
            }
            Err(e) => Err(statement_failed(&self.state, statement, e)),
        }
    }

    fn list_columns(&self, table: &str) -> Result<Vec<String>> {
        let query =
            sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?) ORDER BY cid")
                .bind(table);

        self.runtime
            .block_on(query.fetch_all(&self.pool))
            .map_err(|e| DalError::schema(format!("Could not read columns of '{}': {}", table, e)))
    }

    fn rows_affected(&self) -> u64 {
        self.state.outcome().rows_affected
    }

    fn last_insert_id(&self) -> Option<i64> {
        self.state.outcome().last_insert_id
    }

    fn last_error(&self) -> Option<String> {
        self.state.error()
    }
}

impl Drop for SqliteConnection {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}

fn decode_row(row: &SqliteRow) -> Record {
    let mut record = Record::default();
    for column in row.columns() {
        record.insert(column.name(), decode_column(row, column.ordinal()));
    }
    record
}

/// Decode by the value's storage class, which SQLite reports per value
fn decode_column(row: &SqliteRow, index: usize) -> Value {
    let type_name = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_ascii_uppercase(),
        Err(_) => return Value::Null,
    };

    let decoded = match type_name.as_str() {
        name if name.contains("INT") => row.try_get_unchecked::<i64, _>(index).map(Value::from),
        "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => {
            row.try_get_unchecked::<f64, _>(index).map(Value::from)
        }
        "BOOLEAN" => row.try_get_unchecked::<bool, _>(index).map(Value::from),
        "BLOB" => row
            .try_get_unchecked::<Vec<u8>, _>(index)
            .map(|bytes| Value::String(String::from_utf8_lossy(&bytes).into_owned())),
        _ => row.try_get_unchecked::<String, _>(index).map(Value::String),
    };

    decoded.unwrap_or_else(|e| {
        tracing::trace!(column = index, type_name = %type_name, error = %e, "undecodable value");
        Value::Null
    })
}
