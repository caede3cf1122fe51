//! Core type definitions for table operations
//!
//! Includes condition mappings, value sets, write targets, and read modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DalError, Result};

// ============================================================================
// Conditions
// ============================================================================

/// Ordered column → value mapping used to filter rows
///
/// Insertion order is kept; it decides the order of the rendered fragments.
/// Setting the same column twice replaces the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions(Vec<(String, Value)>);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column constraint
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.0.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => self.0.push((column, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(c, _)| c.as_str())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Conditions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut conditions = Conditions::new();
        for (column, value) in iter {
            conditions.insert(column, value);
        }
        conditions
    }
}

impl TryFrom<Value> for Conditions {
    type Error = DalError;

    /// Build conditions from a JSON object, keeping its key order
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(DalError::validation(format!(
                "Conditions must be a JSON object, got {}",
                other
            ))),
        }
    }
}

// ============================================================================
// Values
// ============================================================================

/// Values for a write
///
/// `Named` values carry their own columns. `Positional` values are paired with
/// an explicit column list, or with every column of the table when none is given.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Named(Vec<(String, Value)>),
    Positional(Vec<Value>),
}

impl Values {
    /// Start an empty named value set
    pub fn named() -> Self {
        Values::Named(Vec::new())
    }

    pub fn positional<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Values::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Set a named value; a positional set is turned into a named one
    pub fn set(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut pairs = match self {
            Values::Named(pairs) => pairs,
            Values::Positional(_) => Vec::new(),
        };
        let column = column.into();
        let value = value.into();
        match pairs.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => pairs.push((column, value)),
        }
        Values::Named(pairs)
    }

    pub fn len(&self) -> usize {
        match self {
            Values::Named(pairs) => pairs.len(),
            Values::Positional(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve to `(columns, values)` aligned by position
    ///
    /// `default_columns` is only consulted for positional values without an
    /// explicit column list.
    pub fn resolve(
        &self,
        columns: Option<&[&str]>,
        default_columns: &[String],
    ) -> Result<(Vec<String>, Vec<Value>)> {
        match (self, columns) {
            (Values::Named(pairs), None) => Ok(pairs.iter().cloned().unzip()),
            (Values::Named(pairs), Some(columns)) => {
                let mut values = Vec::with_capacity(columns.len());
                for column in columns {
                    let value = pairs
                        .iter()
                        .find(|(c, _)| c == column)
                        .map(|(_, v)| v.clone())
                        .ok_or_else(|| DalError::arity(columns.len(), pairs.len()))?;
                    values.push(value);
                }
                Ok((columns.iter().map(|c| c.to_string()).collect(), values))
            }
            (Values::Positional(values), columns) => {
                let columns: Vec<String> = match columns {
                    Some(columns) => columns.iter().map(|c| c.to_string()).collect(),
                    None => default_columns.to_vec(),
                };
                if columns.len() != values.len() {
                    return Err(DalError::arity(columns.len(), values.len()));
                }
                Ok((columns, values.clone()))
            }
        }
    }
}

impl From<Vec<Value>> for Values {
    fn from(values: Vec<Value>) -> Self {
        Values::Positional(values)
    }
}

impl From<Conditions> for Values {
    fn from(conditions: Conditions) -> Self {
        Values::Named(conditions.0)
    }
}

impl TryFrom<Value> for Values {
    type Error = DalError;

    /// Objects become named values, arrays positional values
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Values::Named(map.into_iter().collect())),
            Value::Array(values) => Ok(Values::Positional(values)),
            other => Err(DalError::validation(format!(
                "Values must be a JSON object or array, got {}",
                other
            ))),
        }
    }
}

// ============================================================================
// Write targets
// ============================================================================

/// Which rows an update or delete touches
///
/// Touching every row has to be asked for with `AllRows`; an empty
/// `Matching` is rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    AllRows,
    Matching(Conditions),
}

impl Target {
    /// Conditions to render, `None` for the whole table
    pub fn conditions(&self) -> Result<Option<&Conditions>> {
        match self {
            Target::AllRows => Ok(None),
            Target::Matching(conditions) if conditions.is_empty() => Err(DalError::validation(
                "Empty conditions would touch every row; use Target::AllRows",
            )),
            Target::Matching(conditions) => Ok(Some(conditions)),
        }
    }
}

impl From<Conditions> for Target {
    fn from(conditions: Conditions) -> Self {
        Target::Matching(conditions)
    }
}

// ============================================================================
// Read modes
// ============================================================================

/// How `fetch` matches conditions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Exact equality, conditions joined with AND
    #[default]
    Strict,
    /// Substring match, conditions joined with OR
    Fuzzy,
}

impl FromStr for Mode {
    type Err = DalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "read" | "strict" => Ok(Mode::Strict),
            "search" | "fuzzy" => Ok(Mode::Fuzzy),
            _ => Err(DalError::validation(format!(
                "Invalid mode: '{}'. Must be 'read' or 'search'.",
                s
            ))),
        }
    }
}

/// Direction for client-side ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = DalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortOrder::Asc),
            "DESC" => Ok(SortOrder::Desc),
            _ => Err(DalError::validation(format!(
                "Invalid sort order: '{}'. Must be 'asc' or 'desc'.",
                s
            ))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("ASC"),
            SortOrder::Desc => f.write_str("DESC"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // =========================================================================
    // Conditions Tests
    // =========================================================================

    #[test]
    fn test_conditions_keep_insertion_order() {
        let conditions = Conditions::new().with("title", "Sandal").with("status", "draft");
        let columns: Vec<&str> = conditions.columns().collect();
        assert_eq!(columns, vec!["title", "status"]);
        assert_eq!(conditions.len(), 2);
    }

    #[test]
    fn test_conditions_replace_existing_key() {
        let conditions = Conditions::new()
            .with("title", "Sandal")
            .with("status", "draft")
            .with("title", "Boot");
        let pairs: Vec<(&str, &Value)> = conditions.iter().collect();
        assert_eq!(pairs, vec![("title", &json!("Boot")), ("status", &json!("draft"))]);
    }

    #[test]
    fn test_conditions_from_json_object() {
        let conditions = Conditions::try_from(json!({"status": "draft", "id": 4})).unwrap();
        let columns: Vec<&str> = conditions.columns().collect();
        assert_eq!(columns, vec!["status", "id"]);
    }

    #[test]
    fn test_conditions_from_json_non_object() {
        assert!(Conditions::try_from(json!(["a"])).is_err());
    }

    // =========================================================================
    // Values Tests
    // =========================================================================

    #[test]
    fn test_named_values_resolve_own_columns() {
        let values = Values::named().set("title", "Sandal").set("status", "draft");
        let (columns, values) = values.resolve(None, &[]).unwrap();
        assert_eq!(columns, vec!["title", "status"]);
        assert_eq!(values, vec![json!("Sandal"), json!("draft")]);
    }

    #[test]
    fn test_named_values_projected_by_explicit_columns() {
        let values = Values::named().set("title", "Sandal").set("status", "draft");
        let (columns, values) = values.resolve(Some(&["status"]), &[]).unwrap();
        assert_eq!(columns, vec!["status"]);
        assert_eq!(values, vec![json!("draft")]);
    }

    #[test]
    fn test_named_values_missing_explicit_column() {
        let values = Values::named().set("title", "Sandal");
        let err = values.resolve(Some(&["title", "status"]), &[]).unwrap_err();
        assert!(matches!(err, DalError::ArityMismatch { columns: 2, values: 1 }));
    }

    #[test]
    fn test_positional_values_use_default_columns() {
        let defaults = vec!["id".to_string(), "title".to_string()];
        let values = Values::positional([json!(1), json!("Sandal")]);
        let (columns, _) = values.resolve(None, &defaults).unwrap();
        assert_eq!(columns, defaults);
    }

    #[test]
    fn test_positional_values_arity_mismatch() {
        let values = Values::positional(["Sandal"]);
        let err = values.resolve(Some(&["title", "status"]), &[]).unwrap_err();
        assert!(matches!(err, DalError::ArityMismatch { columns: 2, values: 1 }));
    }

    #[test]
    fn test_values_from_json() {
        assert!(matches!(
            Values::try_from(json!({"title": "Sandal"})).unwrap(),
            Values::Named(_)
        ));
        assert!(matches!(
            Values::try_from(json!(["Sandal"])).unwrap(),
            Values::Positional(_)
        ));
        assert!(Values::try_from(json!("Sandal")).is_err());
    }

    // =========================================================================
    // Target Tests
    // =========================================================================

    #[test]
    fn test_target_all_rows_has_no_conditions() {
        assert!(Target::AllRows.conditions().unwrap().is_none());
    }

    #[test]
    fn test_target_empty_matching_rejected() {
        let err = Target::Matching(Conditions::new()).conditions().unwrap_err();
        assert!(matches!(err, DalError::Validation(_)));
    }

    #[test]
    fn test_target_from_conditions() {
        let target: Target = Conditions::new().with("id", 2).into();
        assert_eq!(target.conditions().unwrap().map(Conditions::len), Some(1));
    }

    // =========================================================================
    // Mode / SortOrder Tests
    // =========================================================================

    #[test]
    fn test_mode_from_str() {
        assert_eq!("read".parse::<Mode>().unwrap(), Mode::Strict);
        assert_eq!("search".parse::<Mode>().unwrap(), Mode::Fuzzy);
        assert_eq!("FUZZY".parse::<Mode>().unwrap(), Mode::Fuzzy);
        assert!("delete".parse::<Mode>().is_err());
        assert_eq!(Mode::default(), Mode::Strict);
    }

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("sideways".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::Desc.to_string(), "DESC");
    }
}
