//! Error types for jetstream-sql-types

use thiserror::Error;

/// Errors that may occur when decoding store values
#[derive(Error, Debug)]
pub enum Error {
   /// Error from the sqlx library. Standard sqlx errors are converted to this variant
   #[error("Sqlx error: {0}")]
   Sqlx(#[from] sqlx::Error),

   /// Store datatype that cannot be mapped to a [`crate::SqlValue`]
   #[error("unsupported datatype: {0}")]
   UnsupportedDatatype(String),
}
