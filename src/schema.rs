//! Table schema known to a binding
//!
//! Holds the table's columns in ordinal order and the column visibility policy.

use serde::{Deserialize, Serialize};

use crate::error::{DalError, Result};

/// Columns of a bound table plus the blacklist/whitelist for default projections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name with any prefix already applied
    #[serde(rename = "tableName")]
    pub table_name: String,
    /// Column names in ordinal position order
    pub columns: Vec<String>,
    /// Columns left out of default projections
    #[serde(default)]
    pub blacklist: Vec<String>,
    /// When set, default projections only include these columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whitelist: Option<Vec<String>>,
}

impl TableSchema {
    /// Create a schema; fails when `columns` is empty
    pub fn new(table_name: impl Into<String>, columns: Vec<String>) -> Result<Self> {
        let table_name = table_name.into();
        if columns.is_empty() {
            return Err(DalError::schema(format!(
                "Table '{}' does not exist or has no columns",
                table_name
            )));
        }
        Ok(Self {
            table_name,
            columns,
            blacklist: Vec::new(),
            whitelist: None,
        })
    }

    /// Set blacklist
    pub fn with_blacklist(mut self, blacklist: Vec<String>) -> Self {
        self.blacklist = blacklist;
        self
    }

    /// Set whitelist
    pub fn with_whitelist(mut self, whitelist: Vec<String>) -> Self {
        self.whitelist = Some(whitelist);
        self
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Fail with [`DalError::UnknownColumn`] unless `name` is one of the table's columns
    pub fn require_column(&self, name: &str) -> Result<()> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(DalError::unknown_column(format!(
                "'{}' is not a column of '{}'",
                name, self.table_name
            )))
        }
    }

    /// Columns used when a read names none, in ordinal order
    ///
    /// With neither list set this is every column.
    pub fn visible_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| {
                self.whitelist
                    .as_ref()
                    .is_none_or(|whitelist| whitelist.contains(c))
            })
            .filter(|c| !self.blacklist.contains(c))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> TableSchema {
        TableSchema::new(
            "users",
            vec![
                "id".to_string(),
                "email".to_string(),
                "password".to_string(),
                "name".to_string(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_empty_columns_is_schema_error() {
        let err = TableSchema::new("ghost", Vec::new()).unwrap_err();
        assert!(matches!(err, DalError::Schema(_)));
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_all_columns_visible_by_default() {
        assert_eq!(users().visible_columns(), users().columns);
    }

    #[test]
    fn test_blacklist_hides_columns() {
        let schema = users().with_blacklist(vec!["password".to_string()]);
        assert_eq!(schema.visible_columns(), vec!["id", "email", "name"]);
    }

    #[test]
    fn test_whitelist_restricts_in_ordinal_order() {
        let schema = users().with_whitelist(vec!["name".to_string(), "id".to_string()]);
        assert_eq!(schema.visible_columns(), vec!["id", "name"]);
    }

    #[test]
    fn test_blacklist_applies_within_whitelist() {
        let schema = users()
            .with_whitelist(vec!["id".to_string(), "password".to_string()])
            .with_blacklist(vec!["password".to_string()]);
        assert_eq!(schema.visible_columns(), vec!["id"]);
    }

    #[test]
    fn test_require_column() {
        assert!(users().require_column("email").is_ok());
        let err = users().require_column("price").unwrap_err();
        assert!(matches!(err, DalError::UnknownColumn(_)));
    }

    #[test]
    fn test_schema_serialization() {
        let json = serde_json::to_string(&users()).unwrap();
        assert!(json.contains("\"tableName\""));
        assert!(!json.contains("whitelist"));
    }
}
