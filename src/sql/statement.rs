//! Composed statements ready to hand to a connection

use crate::sql::dialect::Dialect;
use crate::sql::sanitize::escape_literal;

/// What a statement does, used by connections to decide which counters to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Raw,
}

/// SQL text with `?` placeholders plus the parameters bound to them, in order
///
/// Every parameter travels as text; `None` binds SQL NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Option<String>>,
    pub kind: StatementKind,
    pub dialect: Dialect,
}

impl Statement {
    pub fn new(
        dialect: Dialect,
        kind: StatementKind,
        sql: impl Into<String>,
        params: Vec<Option<String>>,
    ) -> Self {
        Self {
            sql: sql.into(),
            params,
            kind,
            dialect,
        }
    }

    /// A parameterless statement, e.g. DDL issued by application code
    pub fn raw(dialect: Dialect, sql: impl Into<String>) -> Self {
        Self::new(dialect, StatementKind::Raw, sql, Vec::new())
    }

    /// Render the statement with every parameter inlined as an escaped,
    /// single-quoted literal
    ///
    /// The output is for logs and assertions only. Placeholders inside quoted
    /// identifiers or string literals are left alone.
    ///
    /// # Example
    /// ```
    /// use tabula::sql::{Dialect, Statement, StatementKind};
    ///
    /// let stmt = Statement::new(
    ///     Dialect::Sqlite,
    ///     StatementKind::Select,
    ///     "SELECT id FROM shoes WHERE title = ?",
    ///     vec![Some("O'Neil".to_string())],
    /// );
    /// assert_eq!(stmt.render_inline(), "SELECT id FROM shoes WHERE title = 'O''Neil'");
    /// ```
    pub fn render_inline(&self) -> String {
        let mut out = String::with_capacity(self.sql.len() + self.params.len() * 8);
        let mut params = self.params.iter();
        let mut quoted: Option<char> = None;

        for c in self.sql.chars() {
            match quoted {
                Some(q) => {
                    if c == q {
                        quoted = None;
                    }
                    out.push(c);
                }
                None => match c {
                    '\'' | '"' | '`' => {
                        quoted = Some(c);
                        out.push(c);
                    }
                    '?' => match params.next() {
                        Some(Some(value)) => {
                            out.push('\'');
                            out.push_str(&escape_literal(self.dialect, value));
                            out.push('\'');
                        }
                        Some(None) => out.push_str("NULL"),
                        None => out.push('?'),
                    },
                    other => out.push(other),
                },
            }
        }

        out
    }
}
