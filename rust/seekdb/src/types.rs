//! Rows and values returned by [`SeekdbClient::execute`](crate::SeekdbClient::execute).
//!
//! The row shape depends on the backend: the server and OceanBase backends return
//! [`Row::Named`] rows keyed by column label, the embedded engine returns
//! [`Row::Positional`] rows. [`Row::get_index`] works for both.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::Serialize;
use sqlx::mysql::MySqlRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

/// A single decoded cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL `NULL`.
    Null,
    /// Any signed integer column.
    Int(i64),
    /// Unsigned integer columns that may not fit in an `i64`.
    UInt(u64),
    /// `FLOAT`, `DOUBLE` and `REAL` columns.
    Float(f64),
    /// Character data, and any value whose type has no dedicated variant.
    Text(String),
    /// Binary data.
    Bytes(Vec<u8>),
}

impl Value {
    /// Returns the value as an `i64` if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the value as a string slice if it is textual.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

/// One result row.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// Column label and value pairs, in select-list order.
    Named(Vec<(String, Value)>),
    /// Values in select-list order.
    Positional(Vec<Value>),
}

impl Row {
    /// Looks up a column by label. Always `None` for positional rows.
    pub fn get(&self, column: &str) -> Option<&Value> {
        match self {
            Row::Named(columns) => columns
                .iter()
                .find(|(name, _)| name == column)
                .map(|(_, value)| value),
            Row::Positional(_) => None,
        }
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Row::Named(columns) => columns.get(index).map(|(_, value)| value),
            Row::Positional(values) => values.get(index),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Row::Named(columns) => columns.len(),
            Row::Positional(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> Vec<&Value> {
        match self {
            Row::Named(columns) => columns.iter().map(|(_, value)| value).collect(),
            Row::Positional(values) => values.iter().collect(),
        }
    }

    /// Column labels, only available on named rows.
    pub fn column_names(&self) -> Option<Vec<&str>> {
        match self {
            Row::Named(columns) => Some(columns.iter().map(|(name, _)| name.as_str()).collect()),
            Row::Positional(_) => None,
        }
    }
}

// Named rows serialize as objects so `{"test": 1}` reads the way the server returned it.
impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Row::Named(columns) => {
                let mut map = serializer.serialize_map(Some(columns.len()))?;
                for (name, value) in columns {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Row::Positional(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}

//////////////////////// Decoding ////////////////////////

const MYSQL_BINARY_TYPES: &[&str] = &[
    "BINARY",
    "VARBINARY",
    "BLOB",
    "TINYBLOB",
    "MEDIUMBLOB",
    "LONGBLOB",
    "BIT",
    "GEOMETRY",
];

fn mysql_value(row: &MySqlRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_string();
    let value = match type_name.as_str() {
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            Value::Int(row.try_get_unchecked::<i64, _>(index)?)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => Value::UInt(row.try_get_unchecked::<u64, _>(index)?),
        "FLOAT" | "DOUBLE" => Value::Float(row.try_get_unchecked::<f64, _>(index)?),
        name if MYSQL_BINARY_TYPES.contains(&name) => {
            Value::Bytes(row.try_get_unchecked::<Vec<u8>, _>(index)?)
        }
        _ => match row.try_get_unchecked::<String, _>(index) {
            Ok(text) => Value::Text(text),
            Err(_) => Value::Bytes(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        },
    };
    Ok(value)
}

fn sqlite_value(row: &SqliteRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_string();
    let value = match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => Value::Int(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" => Value::Float(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => Value::Bytes(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        _ => match row.try_get_unchecked::<String, _>(index) {
            Ok(text) => Value::Text(text),
            Err(_) => Value::Bytes(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        },
    };
    Ok(value)
}

pub(crate) fn decode_mysql_row(row: &MySqlRow) -> Result<Row, sqlx::Error> {
    let mut columns = Vec::with_capacity(row.len());
    for column in row.columns() {
        let value = mysql_value(row, column.ordinal())?;
        columns.push((column.name().to_string(), value));
    }
    Ok(Row::Named(columns))
}

pub(crate) fn decode_sqlite_row(row: &SqliteRow) -> Result<Row, sqlx::Error> {
    let mut values = Vec::with_capacity(row.len());
    for index in 0..row.len() {
        values.push(sqlite_value(row, index)?);
    }
    Ok(Row::Positional(values))
}
