//! The connection contract table bindings are written against
//!
//! A connection runs one statement per call and blocks until it completes.
//! It also remembers the counters and error message of the last statement,
//! which is what [`crate::TableBinding::affected`] and
//! [`crate::TableBinding::inserted`] report.

use std::sync::{Mutex, PoisonError};

use crate::error::Result;
use crate::record::Record;
use crate::sql::dialect::Dialect;
use crate::sql::sanitize::escape_literal;
use crate::sql::statement::Statement;

/// Counters reported by a write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOutcome {
    /// Rows changed by the statement
    pub rows_affected: u64,
    /// Surrogate key assigned by an INSERT
    pub last_insert_id: Option<i64>,
}

/// Database collaborator used by [`crate::TableBinding`]
pub trait Connection {
    /// Dialect statements for this connection must be rendered in
    fn dialect(&self) -> Dialect;

    /// Prefix applied to table names when binding
    fn table_prefix(&self) -> &str {
        ""
    }

    /// Run a statement that returns no rows
    ///
    /// On failure the engine's message is kept for [`Connection::last_error`]
    /// and returned as [`crate::DalError::Statement`].
    fn execute(&self, statement: &Statement) -> Result<QueryOutcome>;

    /// Run a statement and materialize every row it returns
    fn fetch_all(&self, statement: &Statement) -> Result<Vec<Record>>;

    /// Column names of `table` in ordinal position order; empty when the table
    /// does not exist
    fn list_columns(&self, table: &str) -> Result<Vec<String>>;

    /// Escape a raw value for literal embedding between single quotes
    fn escape(&self, raw: &str) -> String {
        escape_literal(self.dialect(), raw)
    }

    /// Rows affected by the last statement
    fn rows_affected(&self) -> u64;

    /// Surrogate key assigned by the last statement, if it was an INSERT
    fn last_insert_id(&self) -> Option<i64>;

    /// Message of the last failed statement
    fn last_error(&self) -> Option<String>;
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn table_prefix(&self) -> &str {
        (**self).table_prefix()
    }

    fn execute(&self, statement: &Statement) -> Result<QueryOutcome> {
        (**self).execute(statement)
    }

    fn fetch_all(&self, statement: &Statement) -> Result<Vec<Record>> {
        (**self).fetch_all(statement)
    }

    fn list_columns(&self, table: &str) -> Result<Vec<String>> {
        (**self).list_columns(table)
    }

    fn escape(&self, raw: &str) -> String {
        (**self).escape(raw)
    }

    fn rows_affected(&self) -> u64 {
        (**self).rows_affected()
    }

    fn last_insert_id(&self) -> Option<i64> {
        (**self).last_insert_id()
    }

    fn last_error(&self) -> Option<String> {
        (**self).last_error()
    }
}

#[derive(Debug, Default)]
struct Counters {
    outcome: QueryOutcome,
    error: Option<String>,
}

/// Last-statement bookkeeping shared by the backends
#[derive(Debug, Default)]
pub struct ConnectionState {
    counters: Mutex<Counters>,
}

impl ConnectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, outcome: QueryOutcome) {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        counters.outcome = outcome;
        counters.error = None;
    }

    pub fn record_failure(&self, message: impl Into<String>) {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        counters.outcome = QueryOutcome::default();
        counters.error = Some(message.into());
    }

    pub fn outcome(&self) -> QueryOutcome {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner).outcome
    }

    pub fn error(&self) -> Option<String> {
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .error
            .clone()
    }
}
