//! Parameter binding helpers for both store backends

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Postgres, Sqlite};

use crate::SqlValue;

/// Bind a single value to a SQLite query
pub fn bind_sqlite<'q>(
   query: Query<'q, Sqlite, SqliteArguments<'q>>,
   value: SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
   match value {
      SqlValue::Null => query.bind(None::<String>),
      SqlValue::Integer(v) => query.bind(v),
      SqlValue::Real(v) => query.bind(v),
      SqlValue::Text(v) => query.bind(v),
      SqlValue::Blob(v) => query.bind(v),
   }
}

/// Bind a single value to a PostgreSQL query
pub fn bind_pg<'q>(
   query: Query<'q, Postgres, PgArguments>,
   value: SqlValue,
) -> Query<'q, Postgres, PgArguments> {
   match value {
      SqlValue::Null => query.bind(None::<String>),
      SqlValue::Integer(v) => query.bind(v),
      SqlValue::Real(v) => query.bind(v),
      SqlValue::Text(v) => query.bind(v),
      SqlValue::Blob(v) => query.bind(v),
   }
}

/// Bind an ordered parameter list to a SQLite query
pub fn bind_all_sqlite<'q>(
   mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
   params: &[SqlValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
   for param in params {
      query = bind_sqlite(query, param.clone());
   }
   query
}

/// Bind an ordered parameter list to a PostgreSQL query
pub fn bind_all_pg<'q>(
   mut query: Query<'q, Postgres, PgArguments>,
   params: &[SqlValue],
) -> Query<'q, Postgres, PgArguments> {
   for param in params {
      query = bind_pg(query, param.clone());
   }
   query
}
