//! Bulk sync service behavior against fake secondary sinks

use async_trait::async_trait;
use jetstream_primary::PrimaryStore;
use jetstream_replication::{BulkSyncService, Error, SecondarySink, SqlValue, SyncState};
use jetstream_replica::Error as ReplicaError;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Fake secondary that stores synced rows keyed by their first column,
/// mimicking insert-ignoring-conflicts semantics on the primary key.
struct MemorySink {
   active: bool,
   fail_table: Option<String>,
   delay: Duration,
   tables: Mutex<HashMap<String, HashSet<String>>>,
   copied_tables: Mutex<Vec<String>>,
}

impl MemorySink {
   fn new() -> Self {
      Self {
         active: true,
         fail_table: None,
         delay: Duration::ZERO,
         tables: Mutex::new(HashMap::new()),
         copied_tables: Mutex::new(Vec::new()),
      }
   }

   fn failing_on(table: &str) -> Self {
      Self {
         fail_table: Some(table.to_owned()),
         ..Self::new()
      }
   }

   fn copied_tables(&self) -> Vec<String> {
      self.copied_tables.lock().unwrap().clone()
   }
}

#[async_trait]
impl SecondarySink for MemorySink {
   fn is_active(&self) -> bool {
      self.active
   }

   async fn apply(&self, _stmt: &str, _params: &[SqlValue]) -> Result<u64, ReplicaError> {
      Ok(1)
   }

   async fn copy_rows(
      &self,
      table: &str,
      _columns: &[String],
      rows: &[Vec<SqlValue>],
      _batch_size: usize,
   ) -> Result<u64, ReplicaError> {
      self.copied_tables.lock().unwrap().push(table.to_owned());

      if !self.delay.is_zero() {
         tokio::time::sleep(self.delay).await;
      }

      if self.fail_table.as_deref() == Some(table) {
         return Err(ReplicaError::Unavailable("induced table failure".into()));
      }

      let mut tables = self.tables.lock().unwrap();
      let keys = tables.entry(table.to_owned()).or_default();

      // Rows already present (by primary key) are left untouched
      let mut inserted = 0;
      for row in rows {
         let key = format!("{:?}", row.first());
         if keys.insert(key) {
            inserted += 1;
         }
      }
      Ok(inserted)
   }
}

/// Primary store seeded with a three-table slice of the reservation schema
async fn seeded_primary() -> (tempfile::TempDir, Arc<PrimaryStore>) {
   let dir = tempfile::tempdir().unwrap();
   let store = PrimaryStore::connect(dir.path().join("primary.db"), None)
      .await
      .unwrap();

   let mut writer = store.acquire_writer().await.unwrap();
   for stmt in [
      "CREATE TABLE users (user_id INTEGER PRIMARY KEY, username TEXT)",
      "CREATE TABLE bookings (booking_id INTEGER PRIMARY KEY, pnr TEXT, user_id INTEGER)",
      "CREATE TABLE cancellations (cancellation_id INTEGER PRIMARY KEY, booking_id INTEGER)",
      "INSERT INTO users (user_id, username) VALUES (1, 'alice'), (2, 'bob')",
      "INSERT INTO bookings (booking_id, pnr, user_id) VALUES (1, 'PNR123', 1)",
   ] {
      sqlx::query(stmt).execute(&mut *writer).await.unwrap();
   }
   drop(writer);

   (dir, store)
}

fn table_list() -> Vec<String> {
   vec!["users".into(), "bookings".into(), "cancellations".into()]
}

#[tokio::test]
async fn test_sync_all_counts_rows_per_table() {
   let (_dir, primary) = seeded_primary().await;
   let sink = Arc::new(MemorySink::new());
   let service = BulkSyncService::with_tables(primary, Arc::clone(&sink) as _, 100, table_list());

   assert_eq!(service.state(), SyncState::Idle);

   let result = service.sync_all().await.unwrap();

   assert!(result.success);
   assert_eq!(result.total_rows_synced, 3);
   assert_eq!(result.table_rows["users"], 2);
   assert_eq!(result.table_rows["bookings"], 1);
   assert_eq!(result.table_rows["cancellations"], 0);
   assert!(result.table_errors.is_empty());
   assert_eq!(result.message, "sync completed: 3 rows");
   assert_eq!(service.state(), SyncState::Completed);
}

#[tokio::test]
async fn test_failing_table_does_not_abort_remaining_tables() {
   let (_dir, primary) = seeded_primary().await;
   let sink = Arc::new(MemorySink::failing_on("bookings"));
   let service = BulkSyncService::with_tables(primary, Arc::clone(&sink) as _, 100, table_list());

   let result = service.sync_all().await.unwrap();

   assert!(!result.success);
   assert_eq!(result.table_errors.len(), 1);
   assert!(result.table_errors.contains_key("bookings"));

   // Tables after the failing one were still attempted, in order
   assert_eq!(sink.copied_tables(), vec!["users", "bookings", "cancellations"]);
   assert_eq!(result.table_rows["users"], 2);
   assert!(result.table_rows.contains_key("cancellations"));
   assert_eq!(service.state(), SyncState::CompletedWithErrors);
}

#[tokio::test]
async fn test_sync_twice_does_not_error_or_double_count() {
   let (_dir, primary) = seeded_primary().await;
   let sink = Arc::new(MemorySink::new());
   let service = BulkSyncService::with_tables(primary, Arc::clone(&sink) as _, 100, table_list());

   let first = service.sync_all().await.unwrap();
   assert!(first.success);
   assert_eq!(first.total_rows_synced, 3);

   // Every row already exists on the secondary: no error, nothing re-counted
   let second = service.sync_all().await.unwrap();
   assert!(second.success);
   assert_eq!(second.total_rows_synced, 0);
   assert!(second.table_errors.is_empty());
}

#[tokio::test]
async fn test_sync_table_twice_with_existing_row() {
   let (_dir, primary) = seeded_primary().await;
   let sink = Arc::new(MemorySink::new());
   let service = BulkSyncService::with_tables(primary, Arc::clone(&sink) as _, 100, table_list());

   assert_eq!(service.sync_table("bookings").await.unwrap(), 1);
   assert_eq!(service.sync_table("bookings").await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_table_syncs_zero_rows() {
   let (_dir, primary) = seeded_primary().await;
   let sink = Arc::new(MemorySink::new());
   let service = BulkSyncService::with_tables(
      primary,
      sink as _,
      100,
      vec!["users".into(), "not_in_schema".into()],
   );

   let result = service.sync_all().await.unwrap();

   // A table with no columns on the primary is skipped, not an error
   assert!(result.success);
   assert_eq!(result.table_rows["not_in_schema"], 0);
}

#[tokio::test]
async fn test_concurrent_sync_rejected() {
   let (_dir, primary) = seeded_primary().await;
   let sink = Arc::new(MemorySink {
      delay: Duration::from_millis(200),
      ..MemorySink::new()
   });
   let service = Arc::new(BulkSyncService::with_tables(
      primary,
      sink as _,
      100,
      table_list(),
   ));

   let handle = service.spawn_sync_all();
   tokio::time::sleep(Duration::from_millis(50)).await;

   assert_eq!(service.state(), SyncState::Running);
   let second = service.sync_all().await;
   assert!(matches!(second, Err(Error::SyncAlreadyRunning)));

   // The original run is unaffected by the rejected trigger
   let first = handle.await.unwrap().unwrap();
   assert!(first.success);
   assert_eq!(first.total_rows_synced, 3);
}

#[tokio::test]
async fn test_disabled_secondary_completes_without_syncing() {
   let (_dir, primary) = seeded_primary().await;
   let sink = Arc::new(MemorySink {
      active: false,
      ..MemorySink::new()
   });
   let service = BulkSyncService::with_tables(primary, Arc::clone(&sink) as _, 100, table_list());

   let result = service.sync_all().await.unwrap();

   assert!(!result.success);
   assert_eq!(result.message, "secondary store is not enabled");
   assert!(sink.copied_tables().is_empty());
   assert_eq!(service.state(), SyncState::CompletedWithErrors);
}

#[tokio::test]
async fn test_small_batches_cover_all_rows() {
   let (_dir, primary) = seeded_primary().await;

   // Grow users beyond one batch
   let mut writer = primary.acquire_writer().await.unwrap();
   for i in 3..=25_i64 {
      sqlx::query("INSERT INTO users (user_id, username) VALUES (?, ?)")
         .bind(i)
         .bind(format!("user{i}"))
         .execute(&mut *writer)
         .await
         .unwrap();
   }
   drop(writer);

   let sink = Arc::new(MemorySink::new());
   let service = BulkSyncService::with_tables(
      primary,
      Arc::clone(&sink) as _,
      10,
      vec!["users".into()],
   );

   let result = service.sync_all().await.unwrap();
   assert!(result.success);
   assert_eq!(result.table_rows["users"], 25);
}
