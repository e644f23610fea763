//! Tagged SQL parameter values

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A typed SQL parameter value.
///
/// Mutations carry an ordered list of these instead of loosely typed values so
/// that binding is deterministic across both store backends. Integers are
/// always 64-bit; secondary schemas are expected to use 64-bit-compatible
/// integer columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
   /// SQL NULL
   Null,
   /// 64-bit integer (also carries booleans, stored as 0/1)
   Integer(i64),
   /// 64-bit float
   Real(f64),
   /// UTF-8 text
   Text(String),
   /// Raw bytes (SQLite BLOB / PostgreSQL bytea)
   Blob(Vec<u8>),
}

impl SqlValue {
   /// Convert a JSON value from the application layer into a typed parameter.
   ///
   /// Integer precision is preserved by preferring i64 when the number fits;
   /// u64 values above `i64::MAX` fall back to f64 and lose precision.
   /// Arrays and objects are serialized to their JSON text representation.
   pub fn from_json(value: JsonValue) -> Self {
      match value {
         JsonValue::Null => SqlValue::Null,
         JsonValue::Bool(b) => SqlValue::Integer(i64::from(b)),
         JsonValue::Number(number) => {
            if let Some(int_val) = number.as_i64() {
               SqlValue::Integer(int_val)
            } else if let Some(uint_val) = number.as_u64() {
               // Try to fit u64 into i64 (both stores bind 64-bit integers)
               if uint_val <= i64::MAX as u64 {
                  SqlValue::Integer(uint_val as i64)
               } else {
                  SqlValue::Real(uint_val as f64)
               }
            } else {
               SqlValue::Real(number.as_f64().unwrap_or_default())
            }
         }
         JsonValue::String(s) => SqlValue::Text(s),
         other => SqlValue::Text(other.to_string()),
      }
   }

   /// Returns true for [`SqlValue::Null`]
   pub fn is_null(&self) -> bool {
      matches!(self, SqlValue::Null)
   }
}

impl From<i64> for SqlValue {
   fn from(v: i64) -> Self {
      SqlValue::Integer(v)
   }
}

impl From<i32> for SqlValue {
   fn from(v: i32) -> Self {
      SqlValue::Integer(i64::from(v))
   }
}

impl From<f64> for SqlValue {
   fn from(v: f64) -> Self {
      SqlValue::Real(v)
   }
}

impl From<bool> for SqlValue {
   fn from(v: bool) -> Self {
      SqlValue::Integer(i64::from(v))
   }
}

impl From<&str> for SqlValue {
   fn from(v: &str) -> Self {
      SqlValue::Text(v.to_owned())
   }
}

impl From<String> for SqlValue {
   fn from(v: String) -> Self {
      SqlValue::Text(v)
   }
}

impl From<Vec<u8>> for SqlValue {
   fn from(v: Vec<u8>) -> Self {
      SqlValue::Blob(v)
   }
}

impl<T> From<Option<T>> for SqlValue
where
   T: Into<SqlValue>,
{
   fn from(v: Option<T>) -> Self {
      match v {
         Some(inner) => inner.into(),
         None => SqlValue::Null,
      }
   }
}
