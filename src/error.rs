//! Error types for the replication layer
//!
//! Primary-path errors propagate synchronously to the caller as the
//! authoritative result. Secondary-path errors never appear here: the
//! coordinator contains them and they are observable only via logs, while
//! bulk sync aggregates them per table into
//! [`crate::SyncResult::table_errors`].

use thiserror::Error;

/// Errors surfaced by the replication layer.
#[derive(Error, Debug)]
pub enum Error {
   /// Primary store unusable for the requested operation (closed handle,
   /// pool failure, IO). Fatal for the requested operation.
   #[error(transparent)]
   Primary(#[from] jetstream_primary::Error),

   /// Primary statement execution failed. Fatal for the requested operation;
   /// the secondary store is not attempted.
   #[error("primary write failed: {0}")]
   PrimaryWrite(#[source] sqlx::Error),

   /// Primary read query failed
   #[error("primary read failed: {0}")]
   PrimaryRead(#[source] sqlx::Error),

   /// A value read from the primary could not be decoded
   #[error(transparent)]
   Decode(#[from] jetstream_sql_types::Error),

   /// A single table's bulk sync failed; its secondary-side transaction was
   /// rolled back. Does not abort the overall sync run.
   #[error("sync of table '{table}' failed: {source}")]
   TableSync {
      table: String,
      #[source]
      source: jetstream_replica::Error,
   },

   /// A bulk sync run was triggered while another run is in progress
   #[error("a bulk sync run is already in progress")]
   SyncAlreadyRunning,
}

/// A type alias for Results with our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
