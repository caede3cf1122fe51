//! SQL Identifier and Literal Sanitization Utilities
//!
//! Identifiers are emitted bare when they are plain words and quoted otherwise.
//! Literal escaping follows each engine's native escaping primitive; it is only
//! used to render statements for logs, since values reach the engine as bound
//! parameters.

use std::sync::LazyLock;

use regex::Regex;

use crate::sql::dialect::Dialect;

/// Keywords reserved by SQLite or MySQL that cannot appear as bare identifiers
pub const SQL_RESERVED_WORDS: &[&str] = &[
    "ADD",
    "ALL",
    "ALTER",
    "AND",
    "AS",
    "ASC",
    "BETWEEN",
    "BY",
    "CASE",
    "CHECK",
    "COLLATE",
    "COLUMN",
    "CONSTRAINT",
    "CREATE",
    "CROSS",
    "CURRENT_DATE",
    "CURRENT_TIME",
    "CURRENT_TIMESTAMP",
    "DATABASE",
    "DEFAULT",
    "DELETE",
    "DESC",
    "DISTINCT",
    "DROP",
    "ELSE",
    "EXISTS",
    "FOR",
    "FOREIGN",
    "FROM",
    "FULL",
    "GROUP",
    "HAVING",
    "IN",
    "INDEX",
    "INNER",
    "INSERT",
    "INTERVAL",
    "INTO",
    "IS",
    "JOIN",
    "KEY",
    "LEFT",
    "LIKE",
    "LIMIT",
    "MATCH",
    "NATURAL",
    "NOT",
    "NULL",
    "OFFSET",
    "ON",
    "OR",
    "ORDER",
    "OUTER",
    "PRIMARY",
    "REFERENCES",
    "REPLACE",
    "RIGHT",
    "SELECT",
    "SET",
    "TABLE",
    "THEN",
    "TO",
    "UNION",
    "UNIQUE",
    "UPDATE",
    "USING",
    "VALUES",
    "WHEN",
    "WHERE",
    "WITH",
];

static PLAIN_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Whether an identifier can appear in a statement without quoting
///
/// # Example
/// ```
/// use tabula::sql::is_plain_identifier;
///
/// assert!(is_plain_identifier("shoes"));
/// assert!(!is_plain_identifier("order"));      // reserved keyword
/// assert!(!is_plain_identifier("unit price")); // whitespace
/// ```
pub fn is_plain_identifier(name: &str) -> bool {
    PLAIN_IDENTIFIER.is_match(name)
        && !SQL_RESERVED_WORDS.contains(&name.to_ascii_uppercase().as_str())
}

/// Render an identifier for the given dialect
///
/// Plain identifiers are returned unchanged. Everything else is wrapped in the
/// dialect's quote character, with embedded quote characters doubled.
///
/// # Example
/// ```
/// use tabula::sql::{quote_identifier, Dialect};
///
/// assert_eq!(quote_identifier(Dialect::Sqlite, "title"), "title");
/// assert_eq!(quote_identifier(Dialect::Sqlite, "order"), "\"order\"");
/// assert_eq!(quote_identifier(Dialect::MySql, "order"), "`order`");
/// ```
pub fn quote_identifier(dialect: Dialect, identifier: &str) -> String {
    if is_plain_identifier(identifier) {
        return identifier.to_string();
    }
    let quote = dialect.identifier_quote();
    let escaped = identifier.replace(quote, &format!("{quote}{quote}"));
    format!("{quote}{escaped}{quote}")
}

/// Escape a raw value for embedding between single quotes
///
/// SQLite doubles single quotes. MySQL backslash-escapes the same set of
/// characters as `mysql_real_escape_string`.
pub fn escape_literal(dialect: Dialect, raw: &str) -> String {
    match dialect {
        Dialect::Sqlite => raw.replace('\'', "''"),
        Dialect::MySql => {
            let mut escaped = String::with_capacity(raw.len());
            for c in raw.chars() {
                match c {
                    '\0' => escaped.push_str("\\0"),
                    '\n' => escaped.push_str("\\n"),
                    '\r' => escaped.push_str("\\r"),
                    '\\' => escaped.push_str("\\\\"),
                    '\'' => escaped.push_str("\\'"),
                    '"' => escaped.push_str("\\\""),
                    '\x1a' => escaped.push_str("\\Z"),
                    other => escaped.push(other),
                }
            }
            escaped
        }
    }
}
