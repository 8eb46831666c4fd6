//! SQL value representation and sqlx binding.
//!
//! `Value` is the single currency for query parameters and for column values
//! extracted from result rows. Binding and extraction both live here so the
//! type-name table stays in one place.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{Arguments, Column, Row as SqlxRow, TypeInfo};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::{NormError, Result};

/// A SQL-typed value carried by queries and result rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,
    /// BOOLEAN
    Bool(bool),
    /// SMALLINT
    SmallInt(i16),
    /// INTEGER
    Int(i32),
    /// BIGINT
    BigInt(i64),
    /// REAL
    Float(f32),
    /// DOUBLE PRECISION
    Double(f64),
    /// VARCHAR / TEXT
    String(String),
    /// BYTEA
    Bytes(Vec<u8>),
    /// UUID
    Uuid(Uuid),
    /// DATE
    Date(NaiveDate),
    /// TIMESTAMP without time zone
    Timestamp(NaiveDateTime),
    /// TIMESTAMPTZ
    TimestampTz(DateTime<Utc>),
    /// JSON / JSONB
    Json(JsonValue),
    /// NUMERIC / DECIMAL
    Decimal(Decimal),
    /// ARRAY of a primitive element type
    Array(Vec<Value>),
}

impl Value {
    /// Returns the PostgreSQL type name for this value.
    pub fn pg_type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::SmallInt(_) => "SMALLINT",
            Value::Int(_) => "INTEGER",
            Value::BigInt(_) => "BIGINT",
            Value::Float(_) => "REAL",
            Value::Double(_) => "DOUBLE PRECISION",
            Value::String(_) => "TEXT",
            Value::Bytes(_) => "BYTEA",
            Value::Uuid(_) => "UUID",
            Value::Date(_) => "DATE",
            Value::Timestamp(_) => "TIMESTAMP",
            Value::TimestampTz(_) => "TIMESTAMPTZ",
            Value::Json(_) => "JSONB",
            Value::Decimal(_) => "NUMERIC",
            Value::Array(_) => "ARRAY",
        }
    }

    /// True for `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Bind this value as the next parameter of a sqlx query.
    pub fn bind(&self, arguments: &mut PgArguments) -> Result<()> {
        let bind_err = |ty: &str, e: sqlx::error::BoxDynError| {
            NormError::Query(format!("failed to bind {} parameter: {}", ty, e))
        };
        match self {
            Value::Null => arguments
                .add(Option::<i32>::None)
                .map_err(|e| bind_err("NULL", e))?,
            Value::Bool(v) => arguments.add(*v).map_err(|e| bind_err("BOOLEAN", e))?,
            Value::SmallInt(v) => arguments.add(*v).map_err(|e| bind_err("SMALLINT", e))?,
            Value::Int(v) => arguments.add(*v).map_err(|e| bind_err("INTEGER", e))?,
            Value::BigInt(v) => arguments.add(*v).map_err(|e| bind_err("BIGINT", e))?,
            Value::Float(v) => arguments.add(*v).map_err(|e| bind_err("REAL", e))?,
            Value::Double(v) => arguments.add(*v).map_err(|e| bind_err("DOUBLE", e))?,
            Value::String(v) => arguments.add(v.as_str()).map_err(|e| bind_err("TEXT", e))?,
            Value::Bytes(v) => arguments
                .add(v.as_slice())
                .map_err(|e| bind_err("BYTEA", e))?,
            Value::Uuid(v) => arguments.add(*v).map_err(|e| bind_err("UUID", e))?,
            Value::Date(v) => arguments.add(*v).map_err(|e| bind_err("DATE", e))?,
            Value::Timestamp(v) => arguments.add(*v).map_err(|e| bind_err("TIMESTAMP", e))?,
            Value::TimestampTz(v) => arguments
                .add(*v)
                .map_err(|e| bind_err("TIMESTAMPTZ", e))?,
            Value::Json(v) => arguments.add(v.clone()).map_err(|e| bind_err("JSONB", e))?,
            Value::Decimal(v) => arguments.add(*v).map_err(|e| bind_err("NUMERIC", e))?,
            Value::Array(values) => bind_array(values, arguments)?,
        }
        Ok(())
    }

    /// Convert to a JSON value for cache payloads and struct scanning.
    pub fn to_json(&self) -> Result<JsonValue> {
        Ok(match self {
            Value::Null => JsonValue::Null,
            Value::Bool(v) => JsonValue::Bool(*v),
            Value::SmallInt(v) => JsonValue::from(*v),
            Value::Int(v) => JsonValue::from(*v),
            Value::BigInt(v) => JsonValue::from(*v),
            Value::Float(v) => JsonValue::from(*v),
            Value::Double(v) => JsonValue::from(*v),
            Value::String(v) => JsonValue::String(v.clone()),
            Value::Bytes(v) => JsonValue::Array(v.iter().map(|b| JsonValue::from(*b)).collect()),
            Value::Uuid(v) => JsonValue::String(v.to_string()),
            Value::Date(v) => JsonValue::String(v.to_string()),
            Value::Timestamp(v) => JsonValue::String(v.to_string()),
            Value::TimestampTz(v) => JsonValue::String(v.to_rfc3339()),
            Value::Json(v) => v.clone(),
            Value::Decimal(v) => JsonValue::String(v.to_string()),
            Value::Array(values) => {
                let mut items = Vec::with_capacity(values.len());
                for v in values {
                    items.push(v.to_json()?);
                }
                JsonValue::Array(items)
            }
        })
    }

    /// Rebuild a value from a cached JSON payload.
    ///
    /// Decoding is structural: integers come back as `BigInt`, floats as
    /// `Double`, temporal values as their string form. Cached result sets are
    /// compared in encoded form, so this lossy mapping is acceptable.
    pub fn from_json(json: &JsonValue) -> Value {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::BigInt(i)
                } else {
                    Value::Double(n.as_f64().unwrap_or(0.0))
                }
            }
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Array(items) => Value::Array(items.iter().map(Value::from_json).collect()),
            JsonValue::Object(_) => Value::Json(json.clone()),
        }
    }

    /// Stable textual form used when fingerprinting bound arguments.
    pub(crate) fn fingerprint_repr(&self) -> String {
        match self {
            Value::String(s) => format!("s:{}", s),
            Value::Json(v) => format!("j:{}", v),
            other => format!("{:?}", other),
        }
    }
}

/// Total ordering used by app-side merge post-ordering.
///
/// NULL sorts first; numeric variants compare through f64; otherwise values of
/// differing kinds fall back to their type-name order so the sort stays total.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    fn numeric(v: &Value) -> Option<f64> {
        match v {
            Value::SmallInt(n) => Some(*n as f64),
            Value::Int(n) => Some(*n as f64),
            Value::BigInt(n) => Some(*n as f64),
            Value::Float(n) => Some(*n as f64),
            Value::Double(n) => Some(*n),
            Value::Decimal(n) => n.to_string().parse().ok(),
            _ => None,
        }
    }

    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bytes(x), Value::Bytes(y)) => x.cmp(y),
        (Value::Uuid(x), Value::Uuid(y)) => x.cmp(y),
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (Value::TimestampTz(x), Value::TimestampTz(y)) => x.cmp(y),
        _ => match (numeric(a), numeric(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.pg_type_name().cmp(b.pg_type_name()),
        },
    }
}

/// Bind a homogeneous array of primitives as a native PostgreSQL array.
///
/// Mixed element kinds cannot be expressed as a typed array and are rejected.
fn bind_array(values: &[Value], arguments: &mut PgArguments) -> Result<()> {
    let bind_err =
        |ty: &str, e: sqlx::error::BoxDynError| NormError::Query(format!("failed to bind {}: {}", ty, e));

    let element = values.iter().find(|v| !v.is_null());
    match element {
        None => arguments
            .add(Option::<Vec<i32>>::None)
            .map_err(|e| bind_err("empty ARRAY", e)),
        Some(Value::SmallInt(_)) => {
            let items = collect_array(values, |v| match v {
                Value::SmallInt(n) => Some(*n),
                _ => None,
            })?;
            arguments.add(items).map_err(|e| bind_err("INT2[]", e))
        }
        Some(Value::Int(_)) => {
            let items = collect_array(values, |v| match v {
                Value::Int(n) => Some(*n),
                _ => None,
            })?;
            arguments.add(items).map_err(|e| bind_err("INT4[]", e))
        }
        Some(Value::BigInt(_)) => {
            let items = collect_array(values, |v| match v {
                Value::BigInt(n) => Some(*n),
                _ => None,
            })?;
            arguments.add(items).map_err(|e| bind_err("INT8[]", e))
        }
        Some(Value::Float(_)) => {
            let items = collect_array(values, |v| match v {
                Value::Float(n) => Some(*n),
                _ => None,
            })?;
            arguments.add(items).map_err(|e| bind_err("FLOAT4[]", e))
        }
        Some(Value::Double(_)) => {
            let items = collect_array(values, |v| match v {
                Value::Double(n) => Some(*n),
                _ => None,
            })?;
            arguments.add(items).map_err(|e| bind_err("FLOAT8[]", e))
        }
        Some(Value::Bool(_)) => {
            let items = collect_array(values, |v| match v {
                Value::Bool(b) => Some(*b),
                _ => None,
            })?;
            arguments.add(items).map_err(|e| bind_err("BOOL[]", e))
        }
        Some(Value::String(_)) => {
            let items = collect_array(values, |v| match v {
                Value::String(s) => Some(s.clone()),
                _ => None,
            })?;
            arguments.add(items).map_err(|e| bind_err("TEXT[]", e))
        }
        Some(Value::Uuid(_)) => {
            let items = collect_array(values, |v| match v {
                Value::Uuid(u) => Some(*u),
                _ => None,
            })?;
            arguments.add(items).map_err(|e| bind_err("UUID[]", e))
        }
        Some(other) => Err(NormError::Query(format!(
            "cannot bind array of {}",
            other.pg_type_name()
        ))),
    }
}

fn collect_array<T, F>(values: &[Value], extract: F) -> Result<Vec<Option<T>>>
where
    F: Fn(&Value) -> Option<T>,
{
    values
        .iter()
        .map(|v| {
            if v.is_null() {
                Ok(None)
            } else {
                extract(v).map(Some).ok_or_else(|| {
                    NormError::Query("heterogeneous array cannot be bound".to_string())
                })
            }
        })
        .collect()
}

/// Extract every column of a driver row as `(name, Value)` pairs, in column
/// order.
pub fn extract_row(row: &PgRow) -> Result<Vec<(String, Value)>> {
    let mut columns = Vec::with_capacity(row.columns().len());

    for (idx, column) in row.columns().iter().enumerate() {
        let name = column.name().to_string();
        let type_name = column.type_info().name();
        let value = extract_column(row, idx, type_name)
            .map_err(|e| NormError::Scan(format!("column '{}' ({}): {}", name, type_name, e)))?;
        columns.push((name, value));
    }

    Ok(columns)
}

fn extract_column(row: &PgRow, idx: usize, type_name: &str) -> sqlx::Result<Value> {
    macro_rules! get {
        ($ty:ty, $variant:path) => {
            match row.try_get::<Option<$ty>, _>(idx)? {
                Some(v) => $variant(v),
                None => Value::Null,
            }
        };
    }

    Ok(match type_name {
        "BOOL" | "BOOLEAN" => get!(bool, Value::Bool),
        "INT2" | "SMALLINT" => get!(i16, Value::SmallInt),
        "INT4" | "INTEGER" | "INT" => get!(i32, Value::Int),
        "INT8" | "BIGINT" => get!(i64, Value::BigInt),
        "FLOAT4" | "REAL" => get!(f32, Value::Float),
        "FLOAT8" | "DOUBLE PRECISION" => get!(f64, Value::Double),
        "VARCHAR" | "TEXT" | "CHAR" | "BPCHAR" | "NAME" => get!(String, Value::String),
        "BYTEA" => get!(Vec<u8>, Value::Bytes),
        "UUID" => get!(Uuid, Value::Uuid),
        "DATE" => get!(NaiveDate, Value::Date),
        "TIMESTAMP" => get!(NaiveDateTime, Value::Timestamp),
        "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" => get!(DateTime<Utc>, Value::TimestampTz),
        "JSON" | "JSONB" => get!(JsonValue, Value::Json),
        "NUMERIC" | "DECIMAL" => get!(Decimal, Value::Decimal),
        "INT2[]" => array_from(row.try_get::<Option<Vec<Option<i16>>>, _>(idx)?, Value::SmallInt),
        "INT4[]" => array_from(row.try_get::<Option<Vec<Option<i32>>>, _>(idx)?, Value::Int),
        "INT8[]" => array_from(row.try_get::<Option<Vec<Option<i64>>>, _>(idx)?, Value::BigInt),
        "FLOAT4[]" => array_from(row.try_get::<Option<Vec<Option<f32>>>, _>(idx)?, Value::Float),
        "FLOAT8[]" => array_from(row.try_get::<Option<Vec<Option<f64>>>, _>(idx)?, Value::Double),
        "BOOL[]" => array_from(row.try_get::<Option<Vec<Option<bool>>>, _>(idx)?, Value::Bool),
        "TEXT[]" | "VARCHAR[]" => {
            array_from(row.try_get::<Option<Vec<Option<String>>>, _>(idx)?, Value::String)
        }
        "UUID[]" => array_from(row.try_get::<Option<Vec<Option<Uuid>>>, _>(idx)?, Value::Uuid),
        // Unknown types come back as their text form when the driver allows it.
        _ => get!(String, Value::String),
    })
}

fn array_from<T>(items: Option<Vec<Option<T>>>, wrap: fn(T) -> Value) -> Value {
    match items {
        Some(items) => Value::Array(
            items
                .into_iter()
                .map(|i| i.map(wrap).unwrap_or(Value::Null))
                .collect(),
        ),
        None => Value::Null,
    }
}
