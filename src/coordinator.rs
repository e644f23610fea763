//! Dual-write coordination: primary first, secondary best-effort

use crate::error::{Error, Result};
use async_trait::async_trait;
use indexmap::IndexMap;
use jetstream_primary::PrimaryStore;
use jetstream_sql_types::{SqlValue, bind_all_sqlite, row_to_map};
use std::sync::Arc;
use tracing::{debug, warn};

/// The secondary-store seam used by the coordinator and bulk sync.
///
/// The production implementation is [`jetstream_replica::ReplicaClient`]
/// (see [`crate::sink`]); tests substitute fakes to assert call counts and
/// failure containment.
#[async_trait]
pub trait SecondarySink: Send + Sync {
   /// Whether the secondary store currently accepts writes
   fn is_active(&self) -> bool;

   /// Apply one mutation to the secondary store, returning affected rows
   async fn apply(&self, stmt: &str, params: &[SqlValue]) -> std::result::Result<u64, jetstream_replica::Error>;

   /// Replay a full table's rows inside one secondary-side transaction with
   /// conflict-ignoring inserts, in batches of `batch_size`
   async fn copy_rows(
      &self,
      table: &str,
      columns: &[String],
      rows: &[Vec<SqlValue>],
      batch_size: usize,
   ) -> std::result::Result<u64, jetstream_replica::Error>;
}

/// Result of one secondary replication attempt.
///
/// Never raised to the caller of [`DualWriteCoordinator::write`]; observable
/// via logs only.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplicationOutcome {
   /// Secondary write succeeded
   Applied { rows_affected: u64 },
   /// Secondary store disabled, nothing was attempted
   Skipped,
   /// Secondary attempt exhausted its retries
   Failed { error: String },
}

/// Coordinates writes to the primary store (authoritative) and the secondary
/// store (best-effort).
///
/// Ordering guarantee: a mutation is applied to the primary strictly before
/// any attempt to apply it to the secondary. With `async_writes`, there is no
/// ordering guarantee between two different concurrent mutations on the
/// secondary side: replication may be delayed, dropped after retry
/// exhaustion, or applied out of submission order.
///
/// Replication is not idempotent: a retried secondary attempt can apply a
/// mutation twice. Secondary schemas rely on natural unique keys (PNR,
/// usernames) to reject duplicates.
pub struct DualWriteCoordinator {
   primary: Arc<PrimaryStore>,
   secondary: Arc<dyn SecondarySink>,
   async_writes: bool,
}

impl DualWriteCoordinator {
   /// Create a coordinator over an open primary store and a secondary sink.
   ///
   /// Mode (sync/async) is configuration, not a per-call choice.
   pub fn new(
      primary: Arc<PrimaryStore>,
      secondary: Arc<dyn SecondarySink>,
      async_writes: bool,
   ) -> Self {
      Self {
         primary,
         secondary,
         async_writes,
      }
   }

   /// Execute a mutation on the primary store and, on success, replicate it
   /// verbatim to the secondary store.
   ///
   /// Returns the primary's affected-row count. A primary failure fails the
   /// call immediately and the secondary is not attempted. A secondary
   /// failure is contained: it is logged (statement text truncated, never
   /// parameter payloads) and the call still returns the primary's success.
   pub async fn write(&self, stmt: &str, params: &[SqlValue]) -> Result<u64> {
      // First phase: primary store, blocking and authoritative
      let mut writer = self.primary.acquire_writer().await?;
      let query = bind_all_sqlite(sqlx::query(stmt), params);
      let result = query
         .execute(&mut *writer)
         .await
         .map_err(Error::PrimaryWrite)?;
      drop(writer);

      let rows_affected = result.rows_affected();
      debug!("primary write successful: {rows_affected} rows");

      // Second phase: secondary store, best-effort
      if self.secondary.is_active() {
         if self.async_writes {
            let sink = Arc::clone(&self.secondary);
            let stmt = stmt.to_owned();
            let params = params.to_vec();
            tokio::spawn(async move {
               let outcome = replicate(sink.as_ref(), &stmt, &params).await;
               log_outcome(&outcome, &stmt);
            });
         } else {
            let outcome = replicate(self.secondary.as_ref(), stmt, params).await;
            log_outcome(&outcome, stmt);
         }
      }

      Ok(rows_affected)
   }

   /// Execute a read query. Reads are served from the primary store
   /// exclusively; the secondary is write-only from the coordinator's
   /// perspective.
   pub async fn fetch_all(
      &self,
      stmt: &str,
      params: &[SqlValue],
   ) -> Result<Vec<IndexMap<String, SqlValue>>> {
      let rows = bind_all_sqlite(sqlx::query(stmt), params)
         .fetch_all(self.primary.read_pool()?)
         .await
         .map_err(Error::PrimaryRead)?;

      let mut decoded = Vec::with_capacity(rows.len());
      for row in &rows {
         decoded.push(row_to_map(row)?);
      }
      Ok(decoded)
   }

   /// Whether dual-write replication is currently active
   pub fn is_replication_active(&self) -> bool {
      self.secondary.is_active()
   }

   /// The primary store this coordinator writes to
   pub fn primary(&self) -> &Arc<PrimaryStore> {
      &self.primary
   }
}

/// Run one replication attempt against the sink.
///
/// Checked again here because async replications may run after the secondary
/// was disabled at runtime.
async fn replicate(
   sink: &dyn SecondarySink,
   stmt: &str,
   params: &[SqlValue],
) -> ReplicationOutcome {
   if !sink.is_active() {
      return ReplicationOutcome::Skipped;
   }

   match sink.apply(stmt, params).await {
      Ok(rows_affected) => ReplicationOutcome::Applied { rows_affected },
      Err(e) => ReplicationOutcome::Failed {
         error: e.to_string(),
      },
   }
}

fn log_outcome(outcome: &ReplicationOutcome, stmt: &str) {
   match outcome {
      ReplicationOutcome::Applied { rows_affected } => {
         debug!("secondary write applied: {rows_affected} rows");
      }
      ReplicationOutcome::Skipped => {
         debug!("secondary write skipped: secondary store disabled");
      }
      ReplicationOutcome::Failed { error } => {
         warn!("secondary write failed for: {} ({error})", truncate_stmt(stmt));
      }
   }
}

/// Truncate statement text for logging. Parameter payloads are never logged.
fn truncate_stmt(stmt: &str) -> String {
   const MAX_CHARS: usize = 100;
   if stmt.chars().count() > MAX_CHARS {
      let head: String = stmt.chars().take(MAX_CHARS).collect();
      format!("{head}...")
   } else {
      stmt.to_owned()
   }
}
