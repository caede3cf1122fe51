//! TableBinding - CRUD access to a single table
//!
//! A binding ties one table name and its columns to a borrowed connection.
//! It keeps no state between calls: write counters live on the connection and
//! `single` hands back a row instead of storing it.

use crate::connection::{Connection, QueryOutcome};
use crate::error::{DalError, Result};
use crate::record::{Fetched, Record, ResultSet};
use crate::schema::TableSchema;
use crate::sql::clause::{
    Clause, build_assignments, build_equality, build_insert_columns, build_insert_values,
    build_substring,
};
use crate::sql::sanitize::quote_identifier;
use crate::sql::statement::{Statement, StatementKind};
use crate::types::{Conditions, Mode, SortOrder, Target, Values};

/// Row cap applied by [`TableBinding::fetch`]
pub const DEFAULT_FETCH_LIMIT: usize = 10;

/// Single-table data access bound to a connection
///
/// # Example
///
/// ```rust,no_run
/// use tabula::{backend, Conditions, DalConfig, TableBinding, Values};
///
/// let conn = backend::connect(DalConfig::builder("sqlite://shop.db").build())?;
/// let shoes = TableBinding::bind(&conn, "shoes")?;
///
/// shoes.insert(Values::named().set("title", "Sandal").set("status", "draft"), None, None)?;
/// let found = shoes.read(Some(&Conditions::new().with("title", "Sandal")), None)?;
/// assert!(found.is_found());
/// # Ok::<(), tabula::DalError>(())
/// ```
pub struct TableBinding<'c, C: Connection + ?Sized> {
    connection: &'c C,
    schema: TableSchema,
}

/// Builder for a [`TableBinding`] with explicit columns or a visibility policy
pub struct BindingBuilder<'c, C: Connection + ?Sized> {
    connection: &'c C,
    table: String,
    columns: Option<Vec<String>>,
    blacklist: Vec<String>,
    whitelist: Option<Vec<String>>,
}

impl<'c, C: Connection + ?Sized> BindingBuilder<'c, C> {
    /// Use these columns instead of introspecting the table
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Leave these columns out of default projections
    pub fn blacklist<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict default projections to these columns
    pub fn whitelist<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Apply the connection's table prefix, resolve columns, and bind
    pub fn bind(self) -> Result<TableBinding<'c, C>> {
        if self.table.is_empty() {
            return Err(DalError::schema("Table name cannot be empty"));
        }

        let table_name = format!("{}{}", self.connection.table_prefix(), self.table);

        let columns = match self.columns {
            Some(columns) => columns,
            None => self.connection.list_columns(&table_name)?,
        };

        let mut schema = TableSchema::new(&table_name, columns)?.with_blacklist(self.blacklist);
        if let Some(whitelist) = self.whitelist {
            schema = schema.with_whitelist(whitelist);
        }

        if schema.visible_columns().is_empty() {
            return Err(DalError::schema(format!(
                "Column policy for '{}' leaves no visible columns",
                table_name
            )));
        }

        tracing::info!(
            table = %schema.table_name,
            columns = schema.columns.len(),
            "bound table"
        );

        Ok(TableBinding {
            connection: self.connection,
            schema,
        })
    }
}

impl<'c, C: Connection + ?Sized> TableBinding<'c, C> {
    /// Bind `table` (prefix applied) and introspect its columns
    ///
    /// Fails with [`DalError::Schema`] when the table does not exist or has no
    /// columns.
    pub fn bind(connection: &'c C, table: impl Into<String>) -> Result<Self> {
        Self::builder(connection, table).bind()
    }

    pub fn builder(connection: &'c C, table: impl Into<String>) -> BindingBuilder<'c, C> {
        BindingBuilder {
            connection,
            table: table.into(),
            columns: None,
            blacklist: Vec::new(),
            whitelist: None,
        }
    }

    /// Table name with prefix applied
    pub fn table_name(&self) -> &str {
        &self.schema.table_name
    }

    /// Every column of the table in ordinal order
    pub fn columns(&self) -> &[String] {
        &self.schema.columns
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn connection(&self) -> &'c C {
        self.connection
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Create a row, or update the rows matching `conditions`
    ///
    /// Absent or empty conditions create; anything else updates. This is the
    /// entry point application code should write through.
    pub fn insert(
        &self,
        values: Values,
        columns: Option<&[&str]>,
        conditions: Option<&Conditions>,
    ) -> Result<QueryOutcome> {
        match conditions.filter(|c| !c.is_empty()) {
            None => self.create(values, columns),
            Some(conditions) => {
                self.update(&Target::Matching(conditions.clone()), values, columns)
            }
        }
    }

    /// INSERT one row
    ///
    /// Positional values without explicit columns are paired with every column
    /// of the table. On success the assigned key is available from
    /// [`TableBinding::inserted`].
    pub fn create(&self, values: Values, columns: Option<&[&str]>) -> Result<QueryOutcome> {
        let (columns, values) = self.resolve_values(values, columns)?;
        let dialect = self.connection.dialect();

        let placeholders = build_insert_values(dialect, &values);
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.quoted_table(),
            build_insert_columns(dialect, &columns),
            placeholders.sql
        );

        let statement = Statement::new(dialect, StatementKind::Insert, sql, placeholders.params);
        self.connection.execute(&statement)
    }

    /// UPDATE the targeted rows, pairing `columns` and `values` by position
    pub fn update(
        &self,
        target: &Target,
        values: Values,
        columns: Option<&[&str]>,
    ) -> Result<QueryOutcome> {
        let conditions = target.conditions()?;
        let (columns, values) = self.resolve_values(values, columns)?;
        let dialect = self.connection.dialect();

        let assignments = build_assignments(dialect, &columns, &values)?;
        let mut sql = format!("UPDATE {} SET {}", self.quoted_table(), assignments.sql);
        let mut params = assignments.params;

        self.push_where(&mut sql, &mut params, conditions, Mode::Strict)?;
        if conditions.is_none() {
            tracing::warn!(table = %self.schema.table_name, "updating every row");
        }

        let statement = Statement::new(dialect, StatementKind::Update, sql, params);
        self.connection.execute(&statement)
    }

    /// DELETE the targeted rows
    pub fn delete(&self, target: &Target) -> Result<QueryOutcome> {
        let conditions = target.conditions()?;
        let dialect = self.connection.dialect();

        let mut sql = format!("DELETE FROM {}", self.quoted_table());
        let mut params = Vec::new();

        self.push_where(&mut sql, &mut params, conditions, Mode::Strict)?;
        if conditions.is_none() {
            tracing::warn!(table = %self.schema.table_name, "deleting every row");
        }

        let statement = Statement::new(dialect, StatementKind::Delete, sql, params);
        self.connection.execute(&statement)
    }

    /// Rows affected by the last statement on the connection
    pub fn affected(&self) -> u64 {
        self.connection.rows_affected()
    }

    /// Surrogate key assigned by the last INSERT on the connection
    pub fn inserted(&self) -> Option<i64> {
        self.connection.last_insert_id()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// SELECT rows equal to every condition (AND); all rows when absent
    ///
    /// Zero rows, or a statement the engine rejects, give the not-found
    /// sentinel.
    pub fn read(
        &self,
        conditions: Option<&Conditions>,
        columns: Option<&[&str]>,
    ) -> Result<ResultSet> {
        self.select(conditions, columns, Mode::Strict)
    }

    /// SELECT rows containing any condition's value as a substring (OR)
    pub fn search(
        &self,
        conditions: Option<&Conditions>,
        columns: Option<&[&str]>,
    ) -> Result<ResultSet> {
        self.select(conditions, columns, Mode::Fuzzy)
    }

    /// `read` or `search` by mode, keeping at most [`DEFAULT_FETCH_LIMIT`] rows
    pub fn fetch(
        &self,
        conditions: Option<&Conditions>,
        columns: Option<&[&str]>,
        mode: Mode,
    ) -> Result<ResultSet> {
        self.fetch_limited(conditions, columns, mode, DEFAULT_FETCH_LIMIT)
    }

    /// Same as [`TableBinding::fetch`]
    pub fn find(
        &self,
        conditions: Option<&Conditions>,
        columns: Option<&[&str]>,
        mode: Mode,
    ) -> Result<ResultSet> {
        self.fetch(conditions, columns, mode)
    }

    /// `fetch` with an explicit row cap
    ///
    /// The cap truncates the fully materialized result; the engine still
    /// produces every matching row.
    pub fn fetch_limited(
        &self,
        conditions: Option<&Conditions>,
        columns: Option<&[&str]>,
        mode: Mode,
        limit: usize,
    ) -> Result<ResultSet> {
        let results = match mode {
            Mode::Strict => self.read(conditions, columns)?,
            Mode::Fuzzy => self.search(conditions, columns)?,
        };
        Ok(results.limit(limit))
    }

    /// Read the one row identified by `conditions`
    ///
    /// Conditions should name a unique key. When several rows match, the first
    /// is returned.
    pub fn single(
        &self,
        conditions: &Conditions,
        columns: Option<&[&str]>,
    ) -> Result<Fetched<Record>> {
        if conditions.is_empty() {
            return Err(DalError::validation(
                "single() needs conditions identifying one row",
            ));
        }

        match self.read(Some(conditions), columns)? {
            Fetched::Found(rows) => {
                if rows.len() > 1 {
                    tracing::debug!(
                        table = %self.schema.table_name,
                        matched = rows.len(),
                        "single() matched several rows, using the first"
                    );
                }
                Ok(rows
                    .into_iter()
                    .next()
                    .map(Fetched::Found)
                    .unwrap_or_else(Fetched::not_found))
            }
            Fetched::NotFound { error } => Ok(Fetched::NotFound { error }),
        }
    }

    /// Drop the first `n` rows of a result set
    pub fn offset(&self, results: ResultSet, n: usize) -> ResultSet {
        results.offset(n)
    }

    /// Sort a result set by one column
    pub fn order(&self, results: ResultSet, column: &str, order: SortOrder) -> ResultSet {
        results.order_by(column, order)
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn select(
        &self,
        conditions: Option<&Conditions>,
        columns: Option<&[&str]>,
        mode: Mode,
    ) -> Result<ResultSet> {
        let dialect = self.connection.dialect();
        let projection = self.projection(columns)?;

        let mut sql = format!(
            "SELECT {} FROM {}",
            build_insert_columns(dialect, &projection),
            self.quoted_table()
        );
        let mut params = Vec::new();
        self.push_where(&mut sql, &mut params, conditions, mode)?;

        let statement = Statement::new(dialect, StatementKind::Select, sql, params);
        match self.connection.fetch_all(&statement) {
            Ok(rows) if rows.is_empty() => Ok(Fetched::not_found()),
            Ok(rows) => Ok(Fetched::Found(rows)),
            Err(DalError::Statement(message)) => Ok(Fetched::not_found_with(message)),
            Err(e) => Err(e),
        }
    }

    fn push_where(
        &self,
        sql: &mut String,
        params: &mut Vec<Option<String>>,
        conditions: Option<&Conditions>,
        mode: Mode,
    ) -> Result<()> {
        let Some(conditions) = conditions.filter(|c| !c.is_empty()) else {
            return Ok(());
        };

        for column in conditions.columns() {
            self.schema.require_column(column)?;
        }

        let dialect = self.connection.dialect();
        let Clause {
            sql: clause,
            params: clause_params,
        } = match mode {
            Mode::Strict => build_equality(dialect, conditions),
            Mode::Fuzzy => build_substring(dialect, conditions),
        };

        sql.push_str(" WHERE ");
        sql.push_str(&clause);
        params.extend(clause_params);
        Ok(())
    }

    fn projection(&self, columns: Option<&[&str]>) -> Result<Vec<String>> {
        match columns {
            Some(columns) if !columns.is_empty() => {
                for column in columns {
                    self.schema.require_column(column)?;
                }
                Ok(columns.iter().map(|c| c.to_string()).collect())
            }
            _ => Ok(self.schema.visible_columns()),
        }
    }

    fn resolve_values(
        &self,
        values: Values,
        columns: Option<&[&str]>,
    ) -> Result<(Vec<String>, Vec<serde_json::Value>)> {
        let (columns, values) = values.resolve(columns, &self.schema.columns)?;
        if columns.is_empty() {
            return Err(DalError::validation("No values to write"));
        }
        for column in &columns {
            self.schema.require_column(column)?;
        }
        Ok((columns, values))
    }

    fn quoted_table(&self) -> String {
        quote_identifier(self.connection.dialect(), &self.schema.table_name)
    }
}
