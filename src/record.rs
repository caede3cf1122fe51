//! Row and result-set types
//!
//! Includes Record, the Fetched found/not-found result, and client-side
//! paging and ordering over materialized result sets.

use std::cmp::Ordering;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::types::SortOrder;

/// Message carried by the not-found sentinel when a read matches nothing
pub const NOT_FOUND_MESSAGE: &str = "Record Not Found";

/// One row: column name → scalar, in projection order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.0.insert(column.into(), value);
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Deserialize the row into a typed value object
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Outcome of a read: either the data, or a not-found sentinel with a message
///
/// Serializes untagged, so a not-found result renders as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fetched<T> {
    Found(T),
    NotFound { error: String },
}

/// Rows returned by `read`, `search` and `fetch`
pub type ResultSet = Fetched<Vec<Record>>;

impl<T> Fetched<T> {
    pub fn not_found() -> Self {
        Fetched::NotFound {
            error: NOT_FOUND_MESSAGE.to_string(),
        }
    }

    pub fn not_found_with(message: impl Into<String>) -> Self {
        Fetched::NotFound {
            error: message.into(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Fetched::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        !self.is_found()
    }

    /// The sentinel's message, if this is a not-found result
    pub fn message(&self) -> Option<&str> {
        match self {
            Fetched::Found(_) => None,
            Fetched::NotFound { error } => Some(error),
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            Fetched::Found(value) => Some(value),
            Fetched::NotFound { .. } => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Fetched<U> {
        match self {
            Fetched::Found(value) => Fetched::Found(f(value)),
            Fetched::NotFound { error } => Fetched::NotFound { error },
        }
    }
}

impl Fetched<Vec<Record>> {
    /// Rows of a found result; empty for not-found
    pub fn rows(&self) -> &[Record] {
        match self {
            Fetched::Found(rows) => rows,
            Fetched::NotFound { .. } => &[],
        }
    }

    pub fn into_rows(self) -> Vec<Record> {
        self.found().unwrap_or_default()
    }

    pub fn first(&self) -> Option<&Record> {
        self.rows().first()
    }

    /// Drop the first `n` rows; not-found results pass through unchanged
    pub fn offset(self, n: usize) -> Self {
        self.map(|rows| rows.into_iter().skip(n).collect())
    }

    /// Keep at most `n` rows; not-found results pass through unchanged
    pub fn limit(self, n: usize) -> Self {
        self.map(|mut rows| {
            rows.truncate(n);
            rows
        })
    }

    /// Sort rows by one column's value
    ///
    /// Rows missing the column or holding NULL sort first. The sort is stable.
    pub fn order_by(self, column: &str, order: SortOrder) -> Self {
        self.map(|mut rows| {
            rows.sort_by(|a, b| {
                let ordering = compare_values(a.get(column), b.get(column));
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
            rows
        })
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let rank = |v: Option<&Value>| match v {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(_) => 4,
    };

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) if rank(a) == 4 && rank(b) == 4 => x.to_string().cmp(&y.to_string()),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => Record::new(map),
            _ => panic!("record fixture must be an object"),
        }
    }

    fn shoes() -> ResultSet {
        Fetched::Found(vec![
            record(json!({"id": 1, "title": "Sandal", "status": "draft"})),
            record(json!({"id": 2, "title": "Boot", "status": "live"})),
            record(json!({"id": 3, "title": "Clog", "status": null})),
        ])
    }

    fn ids(results: &ResultSet) -> Vec<i64> {
        results
            .rows()
            .iter()
            .map(|r| r.get("id").and_then(Value::as_i64).unwrap())
            .collect()
    }

    // =========================================================================
    // Offset / Limit Tests
    // =========================================================================

    #[test]
    fn test_offset_drops_leading_rows() {
        assert_eq!(ids(&shoes().offset(1)), vec![2, 3]);
    }

    #[test]
    fn test_offset_zero_is_identity() {
        assert_eq!(shoes().offset(0), shoes());
    }

    #[test]
    fn test_offset_past_end_and_empty() {
        assert_eq!(ids(&shoes().offset(10)), Vec::<i64>::new());
        let empty: ResultSet = Fetched::Found(vec![]);
        assert_eq!(empty.clone().offset(3), empty);
    }

    #[test]
    fn test_offset_not_found_passes_through() {
        let results: ResultSet = Fetched::not_found();
        assert_eq!(results.offset(2).message(), Some(NOT_FOUND_MESSAGE));
    }

    #[test]
    fn test_limit_truncates() {
        assert_eq!(ids(&shoes().limit(2)), vec![1, 2]);
        assert_eq!(ids(&shoes().limit(10)), vec![1, 2, 3]);
    }

    // =========================================================================
    // Ordering Tests
    // =========================================================================

    #[test]
    fn test_order_by_string_asc() {
        let ordered = shoes().order_by("title", SortOrder::Asc);
        assert_eq!(ids(&ordered), vec![2, 3, 1]);
    }

    #[test]
    fn test_order_by_desc_reverses() {
        let ordered = shoes().order_by("id", SortOrder::Desc);
        assert_eq!(ids(&ordered), vec![3, 2, 1]);
    }

    #[test]
    fn test_order_by_nulls_first() {
        let ordered = shoes().order_by("status", SortOrder::Asc);
        assert_eq!(ids(&ordered), vec![3, 1, 2]);
    }

    #[test]
    fn test_order_by_numbers_numerically() {
        let results: ResultSet = Fetched::Found(vec![
            record(json!({"n": 10})),
            record(json!({"n": 9})),
            record(json!({"n": 100})),
        ]);
        let ordered = results.order_by("n", SortOrder::Asc);
        let ns: Vec<i64> = ordered.rows().iter().map(|r| r.get("n").unwrap().as_i64().unwrap()).collect();
        assert_eq!(ns, vec![9, 10, 100]);
    }

    // =========================================================================
    // Serialization / Record Tests
    // =========================================================================

    #[test]
    fn test_not_found_serializes_as_error_object() {
        let results: ResultSet = Fetched::not_found();
        assert_eq!(
            serde_json::to_value(&results).unwrap(),
            json!({"error": "Record Not Found"})
        );
    }

    #[test]
    fn test_found_serializes_as_rows() {
        let results: ResultSet = Fetched::Found(vec![record(json!({"id": 1}))]);
        assert_eq!(serde_json::to_value(&results).unwrap(), json!([{"id": 1}]));
    }

    #[test]
    fn test_record_keeps_column_order() {
        let r = record(json!({"title": "Sandal", "id": 1, "status": "draft"}));
        let columns: Vec<&str> = r.columns().collect();
        assert_eq!(columns, vec!["title", "id", "status"]);
    }

    #[test]
    fn test_record_deserialize() {
        #[derive(Deserialize)]
        struct Shoe {
            id: i64,
            title: String,
        }

        let shoe: Shoe = record(json!({"id": 1, "title": "Sandal", "status": "draft"}))
            .deserialize()
            .unwrap();
        assert_eq!(shoe.id, 1);
        assert_eq!(shoe.title, "Sandal");
    }
}
