//! Clause building for WHERE, SET and VALUES fragments
//!
//! Converts condition mappings and value sets into SQL fragments with `?`
//! placeholders. Values never appear in the SQL text; they are returned as
//! parameters in placeholder order.

use serde_json::Value;

use crate::error::{DalError, Result};
use crate::sql::dialect::Dialect;
use crate::sql::sanitize::quote_identifier;
use crate::types::Conditions;

/// A rendered fragment and the parameters its placeholders bind to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clause {
    pub sql: String,
    pub params: Vec<Option<String>>,
}

impl Clause {
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Convert a scalar to the text bound for it
///
/// Every value travels as text, numbers included. Booleans become `1`/`0`
/// and JSON `null` becomes SQL NULL.
pub fn to_param(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        other => Some(other.to_string()),
    }
}

/// Build `col = ? AND col = ?` from conditions
///
/// A `null` value renders `col IS NULL`.
///
/// # Example
/// ```
/// use tabula::sql::{build_equality, Dialect};
/// use tabula::Conditions;
///
/// let clause = build_equality(
///     Dialect::Sqlite,
///     &Conditions::new().with("title", "Sandal").with("status", "draft"),
/// );
/// assert_eq!(clause.sql, "title = ? AND status = ?");
/// assert_eq!(clause.params.len(), 2);
/// ```
pub fn build_equality(dialect: Dialect, conditions: &Conditions) -> Clause {
    join_conditions(dialect, conditions, " AND ", |column, value| match value {
        Value::Null => (format!("{} IS NULL", column), None),
        value => (
            format!("{} = {}", column, dialect.placeholder()),
            Some(to_param(value)),
        ),
    })
}

/// Build `col LIKE ? OR col LIKE ?` from conditions, each parameter wrapped in `%`
///
/// LIKE wildcards inside the values are passed through unescaped.
pub fn build_substring(dialect: Dialect, conditions: &Conditions) -> Clause {
    join_conditions(dialect, conditions, " OR ", |column, value| match value {
        Value::Null => (format!("{} IS NULL", column), None),
        value => {
            let needle = to_param(value).unwrap_or_default();
            (
                format!("{} LIKE {}", column, dialect.placeholder()),
                Some(Some(format!("%{}%", needle))),
            )
        }
    })
}

fn join_conditions<F>(dialect: Dialect, conditions: &Conditions, separator: &str, render: F) -> Clause
where
    F: Fn(&str, &Value) -> (String, Option<Option<String>>),
{
    let mut fragments = Vec::with_capacity(conditions.len());
    let mut params = Vec::with_capacity(conditions.len());

    for (column, value) in conditions.iter() {
        let (fragment, param) = render(&quote_identifier(dialect, column), value);
        fragments.push(fragment);
        if let Some(param) = param {
            params.push(param);
        }
    }

    Clause {
        sql: fragments.join(separator),
        params,
    }
}

/// Comma-joined column list for INSERT
pub fn build_insert_columns<S: AsRef<str>>(dialect: Dialect, columns: &[S]) -> String {
    columns
        .iter()
        .map(|c| quote_identifier(dialect, c.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Comma-joined placeholders for INSERT, one per value
pub fn build_insert_values(dialect: Dialect, values: &[Value]) -> Clause {
    Clause {
        sql: vec![dialect.placeholder(); values.len()].join(", "),
        params: values.iter().map(to_param).collect(),
    }
}

/// `col = ?, col = ?` pairing columns and values by position
///
/// Fails with [`DalError::ArityMismatch`] when the lengths differ.
pub fn build_assignments<S: AsRef<str>>(
    dialect: Dialect,
    columns: &[S],
    values: &[Value],
) -> Result<Clause> {
    if columns.len() != values.len() {
        return Err(DalError::arity(columns.len(), values.len()));
    }

    let sql = columns
        .iter()
        .map(|c| {
            format!(
                "{} = {}",
                quote_identifier(dialect, c.as_ref()),
                dialect.placeholder()
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    Ok(Clause {
        sql,
        params: values.iter().map(to_param).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    // ==================== Equality ====================

    #[test]
    fn test_equality_single() {
        let clause = build_equality(Dialect::Sqlite, &Conditions::new().with("title", "Sandal"));
        assert_eq!(clause.sql, "title = ?");
        assert_eq!(clause.params, vec![p("Sandal")]);
    }

    #[test]
    fn test_equality_joins_with_and_in_order() {
        let conditions = Conditions::new()
            .with("title", "Sandal")
            .with("status", "draft")
            .with("id", 3);
        let clause = build_equality(Dialect::Sqlite, &conditions);

        assert_eq!(clause.sql, "title = ? AND status = ? AND id = ?");
        assert_eq!(clause.sql.matches(" AND ").count(), conditions.len() - 1);
        assert_eq!(clause.params, vec![p("Sandal"), p("draft"), p("3")]);
    }

    #[test]
    fn test_equality_numbers_and_bools_bound_as_text() {
        let conditions = Conditions::new().with("price", 9.5).with("active", true);
        let clause = build_equality(Dialect::MySql, &conditions);
        assert_eq!(clause.params, vec![p("9.5"), p("1")]);
    }

    #[test]
    fn test_equality_null_is_null() {
        let conditions = Conditions::new().with("title", "Sandal").with("status", Value::Null);
        let clause = build_equality(Dialect::Sqlite, &conditions);
        assert_eq!(clause.sql, "title = ? AND status IS NULL");
        assert_eq!(clause.params, vec![p("Sandal")]);
    }

    #[test]
    fn test_equality_quotes_reserved_columns() {
        let clause = build_equality(Dialect::MySql, &Conditions::new().with("order", 1));
        assert_eq!(clause.sql, "`order` = ?");
    }

    #[test]
    fn test_equality_empty() {
        let clause = build_equality(Dialect::Sqlite, &Conditions::new());
        assert!(clause.is_empty());
        assert!(clause.params.is_empty());
    }

    // ==================== Substring ====================

    #[test]
    fn test_substring_joins_with_or() {
        let conditions = Conditions::new().with("title", "sand").with("status", "dra");
        let clause = build_substring(Dialect::Sqlite, &conditions);
        assert_eq!(clause.sql, "title LIKE ? OR status LIKE ?");
        assert_eq!(clause.params, vec![p("%sand%"), p("%dra%")]);
    }

    #[test]
    fn test_substring_number_value() {
        let clause = build_substring(Dialect::Sqlite, &Conditions::new().with("sku", 42));
        assert_eq!(clause.params, vec![p("%42%")]);
    }

    // ==================== Insert fragments ====================

    #[test]
    fn test_insert_columns() {
        assert_eq!(build_insert_columns(Dialect::Sqlite, &["title", "status"]), "title, status");
        assert_eq!(build_insert_columns(Dialect::MySql, &["key", "value"]), "`key`, value");
    }

    #[test]
    fn test_insert_values() {
        let clause = build_insert_values(Dialect::Sqlite, &[json!("Sandal"), json!(null), json!(2)]);
        assert_eq!(clause.sql, "?, ?, ?");
        assert_eq!(clause.params, vec![p("Sandal"), None, p("2")]);
    }

    // ==================== Assignments ====================

    #[test]
    fn test_assignments() {
        let clause =
            build_assignments(Dialect::Sqlite, &["title", "status"], &[json!("Boot"), json!("live")])
                .unwrap();
        assert_eq!(clause.sql, "title = ?, status = ?");
        assert_eq!(clause.params, vec![p("Boot"), p("live")]);
    }

    #[test]
    fn test_assignments_arity_mismatch() {
        let err = build_assignments(Dialect::Sqlite, &["title", "status"], &[json!("Boot")])
            .unwrap_err();
        assert!(matches!(err, DalError::ArityMismatch { columns: 2, values: 1 }));

        let err = build_assignments::<&str>(Dialect::Sqlite, &[], &[json!("Boot")]).unwrap_err();
        assert!(matches!(err, DalError::ArityMismatch { columns: 0, values: 1 }));
    }

    // ==================== Params ====================

    #[test]
    fn test_to_param() {
        assert_eq!(to_param(&json!("x")), p("x"));
        assert_eq!(to_param(&json!(7)), p("7"));
        assert_eq!(to_param(&json!(false)), p("0"));
        assert_eq!(to_param(&json!(null)), None);
        assert_eq!(to_param(&json!({"a": 1})), p("{\"a\":1}"));
    }
}
