//! Result row representation.
//!
//! A `Row` is an ordered column-name to value map. Rows produced by app-side
//! joins carry each column under both its bare name and its `table.column`
//! form, so scanning into a destination struct works with either spelling.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use sqlx::postgres::PgRow;

use crate::value::{self, Value};
use crate::{NormError, Result};

/// A single row from a query result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: IndexMap<String, Value>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a row from `(name, value)` pairs, keeping order.
    pub fn from_pairs(pairs: Vec<(String, Value)>) -> Self {
        Self {
            columns: pairs.into_iter().collect(),
        }
    }

    /// Converts from a driver row.
    pub fn from_pg(row: &PgRow) -> Result<Self> {
        Ok(Self::from_pairs(value::extract_row(row)?))
    }

    /// Gets a value by column name.
    pub fn get(&self, column: &str) -> Result<&Value> {
        self.columns.get(column).ok_or_else(|| {
            NormError::Scan(format!("column '{}' not found in result set", column))
        })
    }

    /// Gets a value by column name if present.
    pub fn try_get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Inserts or replaces a column value.
    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        self.columns.insert(column.into(), value);
    }

    /// Inserts a column value only when the name is not already present.
    pub(crate) fn set_if_absent(&mut self, column: impl Into<String>, value: Value) {
        self.columns.entry(column.into()).or_insert(value);
    }

    /// All column names, in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|s| s.as_str())
    }

    /// All `(name, value)` pairs, in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Converts the row to a JSON object.
    pub fn to_json(&self) -> Result<JsonValue> {
        let mut map = serde_json::Map::with_capacity(self.columns.len());
        for (name, value) in &self.columns {
            map.insert(name.clone(), value.to_json()?);
        }
        Ok(JsonValue::Object(map))
    }

    /// Rebuilds a row from a JSON object (cache payloads).
    pub fn from_json(json: &JsonValue) -> Result<Self> {
        let object = json
            .as_object()
            .ok_or_else(|| NormError::Scan("cached row is not an object".to_string()))?;
        let mut row = Row::new();
        for (name, value) in object {
            row.set(name.clone(), Value::from_json(value));
        }
        Ok(row)
    }

    /// Scans the row into a deserializable destination type.
    ///
    /// Qualified `table.column` keys are skipped in favor of the bare names
    /// carried alongside them, so plain field names always match.
    pub fn scan<T: DeserializeOwned>(&self) -> Result<T> {
        let mut map = serde_json::Map::with_capacity(self.columns.len());
        for (name, value) in &self.columns {
            match name.split_once('.') {
                Some((_, bare)) => {
                    if !map.contains_key(bare) {
                        map.insert(bare.to_string(), value.to_json()?);
                    }
                }
                None => {
                    map.insert(name.clone(), value.to_json()?);
                }
            }
        }
        serde_json::from_value(JsonValue::Object(map))
            .map_err(|e| NormError::Scan(format!("failed to scan row: {}", e)))
    }
}

/// Encode a result set for cache storage.
pub fn encode_rows(rows: &[Row]) -> Result<Vec<u8>> {
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(row.to_json()?);
    }
    serde_json::to_vec(&JsonValue::Array(items))
        .map_err(|e| NormError::Serialization(e.to_string()))
}

/// Decode a cached result set.
pub fn decode_rows(bytes: &[u8]) -> Result<Vec<Row>> {
    let json: JsonValue =
        serde_json::from_slice(bytes).map_err(|e| NormError::Serialization(e.to_string()))?;
    let items = json
        .as_array()
        .ok_or_else(|| NormError::Scan("cached result set is not an array".to_string()))?;
    items.iter().map(Row::from_json).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn sample_row() -> Row {
        Row::from_pairs(vec![
            ("id".to_string(), Value::BigInt(7)),
            ("name".to_string(), Value::String("alice".to_string())),
            ("active".to_string(), Value::Bool(true)),
        ])
    }

    #[test]
    fn test_get_and_missing_column() {
        let row = sample_row();
        assert_eq!(row.get("id").unwrap(), &Value::BigInt(7));
        assert!(matches!(row.get("nope"), Err(NormError::Scan(_))));
    }

    #[test]
    fn test_scan_into_struct() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct User {
            id: i64,
            name: String,
            active: bool,
        }

        let user: User = sample_row().scan().unwrap();
        assert_eq!(
            user,
            User {
                id: 7,
                name: "alice".to_string(),
                active: true,
            }
        );
    }

    #[test]
    fn test_scan_matches_qualified_or_bare() {
        #[derive(Debug, Deserialize)]
        struct Projection {
            name: String,
            total: i64,
        }

        // Join rows carry both spellings; bare names win during scan.
        let mut row = Row::new();
        row.set("users.name", Value::String("alice".to_string()));
        row.set("name", Value::String("alice".to_string()));
        row.set("orders.total", Value::BigInt(12));
        row.set("total", Value::BigInt(12));

        let p: Projection = row.scan().unwrap();
        assert_eq!(p.name, "alice");
        assert_eq!(p.total, 12);
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let rows = vec![sample_row(), sample_row()];
        let bytes = encode_rows(&rows).unwrap();
        let decoded = decode_rows(&bytes).unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].get("id").unwrap(), &Value::BigInt(7));
        assert_eq!(
            decoded[0].get("name").unwrap(),
            &Value::String("alice".to_string())
        );

        // The encoded form is stable: re-encoding the decoded set is identical.
        assert_eq!(encode_rows(&decoded).unwrap(), bytes);
    }

    #[test]
    fn test_set_if_absent_keeps_first() {
        let mut row = Row::new();
        row.set_if_absent("id", Value::Int(1));
        row.set_if_absent("id", Value::Int(2));
        assert_eq!(row.get("id").unwrap(), &Value::Int(1));
    }
}
