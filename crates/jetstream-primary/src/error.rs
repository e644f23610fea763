//! Error types for jetstream-primary

use thiserror::Error;

/// Errors that may occur when working with the primary store
#[derive(Error, Debug)]
pub enum Error {
   /// IO error when accessing store files. Standard library IO errors
   /// are converted to this variant.
   #[error("IO error: {0}")]
   Io(#[from] std::io::Error),

   /// Error from the sqlx library. Standard sqlx errors are converted to this variant
   #[error("Sqlx error: {0}")]
   Sqlx(#[from] sqlx::Error),

   /// Store has been closed and cannot be used
   #[error("Primary store has been closed")]
   StoreClosed,
}
