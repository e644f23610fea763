//! Wiring for the full replication stack

use crate::config::ReplicationConfig;
use crate::coordinator::{DualWriteCoordinator, SecondarySink};
use crate::error::Result;
use crate::sink::DisabledSink;
use crate::sync::{BulkSyncService, SyncResult, SyncState};
use indexmap::IndexMap;
use jetstream_primary::PrimaryStore;
use jetstream_replica::{ReplicaClient, SecondaryPool, SecondaryPoolConfig};
use jetstream_sql_types::SqlValue;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;

/// The assembled replication stack: primary store, secondary pool and client,
/// dual-write coordinator, and bulk sync service.
///
/// This is the application-facing surface. The UI layer issues writes and
/// reads through it and uses the operational controls to toggle replication
/// and trigger syncs; it never observes secondary-store failures through the
/// write path.
pub struct ReplicationLayer {
   primary: Arc<PrimaryStore>,
   pool: Option<Arc<SecondaryPool>>,
   coordinator: Arc<DualWriteCoordinator>,
   sync_service: Arc<BulkSyncService>,
   secondary_connections: usize,
}

impl ReplicationLayer {
   /// Open the primary store and, when configured, initialize the secondary
   /// pool and client.
   ///
   /// Secondary misconfiguration (missing URL, unparsable URL) and total
   /// pool-initialization failure disable replication rather than failing
   /// initialization: the application keeps running primary-only. Only a
   /// primary-store failure is fatal here.
   pub async fn initialize(
      primary_path: impl AsRef<Path>,
      config: ReplicationConfig,
   ) -> Result<Self> {
      let primary = PrimaryStore::connect(primary_path, None).await?;

      let mut pool = None;
      let mut secondary_connections = 0;
      let secondary: Arc<dyn SecondarySink> = if !config.enabled {
         Arc::new(DisabledSink)
      } else {
         match config.url.as_deref() {
            None => {
               warn!("secondary store enabled but no url configured, replication disabled");
               Arc::new(DisabledSink)
            }
            Some(url) => {
               let pool_config = SecondaryPoolConfig {
                  url: url.to_owned(),
                  pool_size: config.pool_size,
                  validation_timeout_secs: config.validation_timeout_secs,
                  connect_timeout_secs: config.connect_timeout_secs,
               };

               match SecondaryPool::initialize(&pool_config).await {
                  Ok((secondary_pool, opened)) => {
                     let client = Arc::new(ReplicaClient::new(
                        Arc::clone(&secondary_pool),
                        config.max_retries,
                        Duration::from_millis(config.retry_delay_ms),
                     ));
                     pool = Some(secondary_pool);
                     secondary_connections = opened;
                     client
                  }
                  Err(e) => {
                     warn!("secondary store configuration invalid, replication disabled: {e}");
                     Arc::new(DisabledSink)
                  }
               }
            }
         }
      };

      let coordinator = Arc::new(DualWriteCoordinator::new(
         Arc::clone(&primary),
         Arc::clone(&secondary),
         config.async_writes,
      ));

      let sync_service = Arc::new(BulkSyncService::new(
         Arc::clone(&primary),
         secondary,
         config.sync_batch_size,
      ));

      Ok(Self {
         primary,
         pool,
         coordinator,
         sync_service,
         secondary_connections,
      })
   }

   /// Execute a mutation through the dual-write coordinator
   pub async fn write(&self, stmt: &str, params: &[SqlValue]) -> Result<u64> {
      self.coordinator.write(stmt, params).await
   }

   /// Execute a read query against the primary store
   pub async fn fetch_all(
      &self,
      stmt: &str,
      params: &[SqlValue],
   ) -> Result<Vec<IndexMap<String, SqlValue>>> {
      self.coordinator.fetch_all(stmt, params).await
   }

   /// Whether dual-write replication is currently active
   pub fn is_replication_active(&self) -> bool {
      self.coordinator.is_replication_active()
   }

   /// Number of secondary connections opened when the pool was initialized.
   ///
   /// Zero when replication is disabled or pool initialization failed
   /// entirely; a value below the configured pool size indicates partial
   /// initialization.
   pub fn secondary_connections_opened(&self) -> usize {
      self.secondary_connections
   }

   /// Enable or disable secondary replication at runtime.
   ///
   /// A no-op when no secondary pool was initialized (replication stays off).
   pub fn set_replication_enabled(&self, enable: bool) {
      match &self.pool {
         Some(pool) => pool.set_enabled(enable),
         None => {
            if enable {
               warn!("cannot enable replication: no secondary pool was initialized");
            }
         }
      }
   }

   /// Trigger a full bulk sync, blocking until it completes
   pub async fn sync_all(&self) -> Result<SyncResult> {
      self.sync_service.sync_all().await
   }

   /// Trigger a full bulk sync on a background task
   pub fn spawn_sync_all(&self) -> JoinHandle<Result<SyncResult>> {
      self.sync_service.spawn_sync_all()
   }

   /// Current bulk sync lifecycle state
   pub fn sync_state(&self) -> SyncState {
      self.sync_service.state()
   }

   /// The dual-write coordinator
   pub fn coordinator(&self) -> &Arc<DualWriteCoordinator> {
      &self.coordinator
   }

   /// The bulk sync service
   pub fn sync_service(&self) -> &Arc<BulkSyncService> {
      &self.sync_service
   }

   /// The primary store
   pub fn primary(&self) -> &Arc<PrimaryStore> {
      &self.primary
   }

   /// Shut down the stack: drain and close the secondary pool, then close
   /// the primary store.
   pub async fn shutdown(self) -> Result<()> {
      if let Some(pool) = &self.pool {
         pool.shutdown().await;
      }
      self.primary.close().await?;
      Ok(())
   }
}
