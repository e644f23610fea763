//! Bulk synchronization: replay the primary's full state into the secondary

use crate::coordinator::SecondarySink;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use jetstream_primary::PrimaryStore;
use jetstream_sql_types::decode_row;
use serde::Serialize;
use sqlx::Row;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Tables in sync order, parents before children so foreign keys on the
/// secondary are satisfied. Adding a table to the schema requires adding it
/// here in dependency position; the order is never derived dynamically.
pub const SYNC_TABLE_ORDER: [&str; 11] = [
   "users",
   "customer_details",
   "fleet_information",
   "flights",
   "flight_information",
   "seats",
   "fare",
   "bookings",
   "tickets",
   "reserved_seats",
   "cancellations",
];

/// Lifecycle of the bulk sync service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
   /// No run has been triggered yet
   Idle,
   /// A run is in progress; further triggers are rejected
   Running,
   /// The last run finished with no table errors
   Completed,
   /// The last run finished but one or more tables failed
   CompletedWithErrors,
}

/// Aggregate outcome of one bulk sync run
#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
   /// True iff no table produced an error
   pub success: bool,
   /// Human-readable run summary
   pub message: String,
   /// Total rows written to the secondary across all tables
   pub total_rows_synced: u64,
   /// Rows synced per table, in sync order
   pub table_rows: IndexMap<String, u64>,
   /// Error message per failed table, in sync order
   pub table_errors: IndexMap<String, String>,
}

impl SyncResult {
   fn empty() -> Self {
      Self {
         success: false,
         message: String::new(),
         total_rows_synced: 0,
         table_rows: IndexMap::new(),
         table_errors: IndexMap::new(),
      }
   }
}

/// Reconciles the secondary store with the primary's complete state, for
/// initial migration or recovery after secondary downtime.
///
/// Runs are triggered explicitly and are not reentrant: a trigger while a run
/// is in progress is rejected with [`Error::SyncAlreadyRunning`]. Table-level
/// failures are captured into the [`SyncResult`] and do not abort the
/// remaining tables.
pub struct BulkSyncService {
   primary: Arc<PrimaryStore>,
   secondary: Arc<dyn SecondarySink>,
   batch_size: usize,
   tables: Vec<String>,
   state: Mutex<SyncState>,
}

impl BulkSyncService {
   /// Service over the standard table order ([`SYNC_TABLE_ORDER`])
   pub fn new(
      primary: Arc<PrimaryStore>,
      secondary: Arc<dyn SecondarySink>,
      batch_size: usize,
   ) -> Self {
      Self::with_tables(
         primary,
         secondary,
         batch_size,
         SYNC_TABLE_ORDER.iter().map(|t| (*t).to_owned()).collect(),
      )
   }

   /// Service over an explicit dependency-ordered table list
   pub fn with_tables(
      primary: Arc<PrimaryStore>,
      secondary: Arc<dyn SecondarySink>,
      batch_size: usize,
      tables: Vec<String>,
   ) -> Self {
      Self {
         primary,
         secondary,
         batch_size: batch_size.max(1),
         tables,
         state: Mutex::new(SyncState::Idle),
      }
   }

   /// Current lifecycle state
   pub fn state(&self) -> SyncState {
      *self.lock_state()
   }

   /// Sync every table in the configured order.
   ///
   /// The loop always completes the table list: a failing table is recorded
   /// in the result and the remaining tables are still attempted. Overall
   /// success is false if any table failed. With the secondary store
   /// disabled, the run completes immediately with `success == false`.
   pub async fn sync_all(&self) -> Result<SyncResult> {
      self.begin_run()?;

      let mut result = SyncResult::empty();

      if !self.secondary.is_active() {
         result.message = "secondary store is not enabled".to_owned();
         self.finish_run(false);
         return Ok(result);
      }

      info!("starting full sync from primary to secondary store");

      for table in &self.tables {
         match self.sync_table(table).await {
            Ok(rows) => {
               info!("synced {rows} rows from table: {table}");
               result.table_rows.insert(table.clone(), rows);
               result.total_rows_synced += rows;
            }
            Err(e) => {
               warn!("failed to sync table {table}: {e}");
               result.table_errors.insert(table.clone(), e.to_string());
            }
         }
      }

      result.success = result.table_errors.is_empty();
      result.message = if result.success {
         format!("sync completed: {} rows", result.total_rows_synced)
      } else {
         format!(
            "sync completed with errors in {} tables",
            result.table_errors.len()
         )
      };

      info!("{}", result.message);
      self.finish_run(result.success);
      Ok(result)
   }

   /// Sync a single table: read the full column set and all rows from the
   /// primary, then replay them into the secondary inside one transaction.
   ///
   /// A table that is missing from the primary (or has no columns) syncs
   /// zero rows without error. A row that already exists on the secondary is
   /// left untouched rather than failing the transaction.
   pub async fn sync_table(&self, table: &str) -> Result<u64> {
      let columns = self.table_columns(table).await?;
      if columns.is_empty() {
         return Ok(0);
      }

      let select = format!("SELECT * FROM {table}");
      let rows = sqlx::query(&select)
         .fetch_all(self.primary.read_pool()?)
         .await
         .map_err(Error::PrimaryRead)?;

      let mut decoded = Vec::with_capacity(rows.len());
      for row in &rows {
         decoded.push(decode_row(row)?);
      }

      self
         .secondary
         .copy_rows(table, &columns, &decoded, self.batch_size)
         .await
         .map_err(|source| Error::TableSync {
            table: table.to_owned(),
            source,
         })
   }

   /// Trigger a run on a background task so bulk sync never blocks the
   /// invoking thread. The non-reentrancy rule applies across spawned and
   /// direct runs alike.
   pub fn spawn_sync_all(self: &Arc<Self>) -> JoinHandle<Result<SyncResult>> {
      let service = Arc::clone(self);
      tokio::spawn(async move { service.sync_all().await })
   }

   /// Column names for `table` in schema order, from the primary's metadata
   async fn table_columns(&self, table: &str) -> Result<Vec<String>> {
      let pragma = format!("PRAGMA table_info({table})");
      let rows = sqlx::query(&pragma)
         .fetch_all(self.primary.read_pool()?)
         .await
         .map_err(Error::PrimaryRead)?;

      let mut columns = Vec::with_capacity(rows.len());
      for row in &rows {
         columns.push(row.try_get::<String, _>("name").map_err(Error::PrimaryRead)?);
      }
      Ok(columns)
   }

   fn begin_run(&self) -> Result<()> {
      let mut state = self.lock_state();
      if *state == SyncState::Running {
         return Err(Error::SyncAlreadyRunning);
      }
      *state = SyncState::Running;
      Ok(())
   }

   fn finish_run(&self, success: bool) {
      *self.lock_state() = if success {
         SyncState::Completed
      } else {
         SyncState::CompletedWithErrors
      };
   }

   fn lock_state(&self) -> MutexGuard<'_, SyncState> {
      // State is a plain enum; a poisoned lock still holds a coherent value
      self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
   }
}
