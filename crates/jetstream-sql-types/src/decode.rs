//! Decoding SQLite result rows into typed values

use indexmap::IndexMap;
use sqlx::sqlite::{SqliteRow, SqliteValueRef};
use sqlx::{Column, Row, TypeInfo, Value, ValueRef};

use crate::{Error, Result, SqlValue};

/// Convert a single SQLite value to a [`SqlValue`].
///
/// Conversion follows SQLite's type affinity. Booleans are stored as INTEGER;
/// dates, times, and datetimes are kept in their ISO 8601 text form so they
/// replay verbatim on the secondary store.
pub fn decode_value(value: SqliteValueRef<'_>) -> Result<SqlValue> {
   if value.is_null() {
      return Ok(SqlValue::Null);
   }

   let column_type = value.type_info();

   let result = match column_type.name() {
      "TEXT" | "DATE" | "TIME" | "DATETIME" => {
         if let Ok(v) = value.to_owned().try_decode::<String>() {
            SqlValue::Text(v)
         } else {
            SqlValue::Null
         }
      }

      "REAL" => {
         if let Ok(v) = value.to_owned().try_decode::<f64>() {
            SqlValue::Real(v)
         } else {
            SqlValue::Null
         }
      }

      "INTEGER" | "NUMERIC" => {
         if let Ok(v) = value.to_owned().try_decode::<i64>() {
            SqlValue::Integer(v)
         } else {
            SqlValue::Null
         }
      }

      "BOOLEAN" => {
         if let Ok(v) = value.to_owned().try_decode::<bool>() {
            SqlValue::Integer(i64::from(v))
         } else {
            SqlValue::Null
         }
      }

      "BLOB" => {
         if let Ok(v) = value.to_owned().try_decode::<Vec<u8>>() {
            SqlValue::Blob(v)
         } else {
            SqlValue::Null
         }
      }

      "NULL" => SqlValue::Null,

      _ => {
         // For unknown types, try to decode as text
         if let Ok(text) = value.to_owned().try_decode::<String>() {
            SqlValue::Text(text)
         } else {
            return Err(Error::UnsupportedDatatype(format!(
               "Unknown SQLite type: {}",
               column_type.name()
            )));
         }
      }
   };

   Ok(result)
}

/// Decode a full row into values in column order.
///
/// Column order matches the row's declared column order, which for
/// `SELECT *` is the table's schema order.
pub fn decode_row(row: &SqliteRow) -> Result<Vec<SqlValue>> {
   let mut values = Vec::with_capacity(row.columns().len());
   for index in 0..row.columns().len() {
      let raw = row.try_get_raw(index)?;
      values.push(decode_value(raw)?);
   }
   Ok(values)
}

/// Decode a row into an ordered column-name-to-value map
pub fn row_to_map(row: &SqliteRow) -> Result<IndexMap<String, SqlValue>> {
   let mut map = IndexMap::with_capacity(row.columns().len());
   for (index, column) in row.columns().iter().enumerate() {
      let raw = row.try_get_raw(index)?;
      map.insert(column.name().to_owned(), decode_value(raw)?);
   }
   Ok(map)
}
