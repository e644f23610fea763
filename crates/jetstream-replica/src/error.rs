//! Error types for jetstream-replica

use thiserror::Error;

/// Errors that may occur when working with the secondary store.
///
/// None of these are fatal to application callers: the dual-write coordinator
/// contains them, and bulk sync aggregates them per table.
#[derive(Error, Debug)]
pub enum Error {
   /// Error from the sqlx library. Standard sqlx errors are converted to this variant
   #[error("Sqlx error: {0}")]
   Sqlx(#[from] sqlx::Error),

   /// Secondary store is disabled (by configuration, runtime control, or
   /// total pool-initialization failure)
   #[error("Secondary store is disabled")]
   Disabled,

   /// No secondary connection obtainable: the pool is empty and an ad hoc
   /// connection could not be opened
   #[error("No secondary connection obtainable: {0}")]
   Unavailable(String),

   /// Secondary statement execution failed after exhausting all retry attempts
   #[error("Secondary write failed after {attempts} attempts: {last_error}")]
   RetriesExhausted { attempts: u32, last_error: String },
}
