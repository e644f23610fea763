//! Secondary sink implementations

use crate::coordinator::SecondarySink;
use async_trait::async_trait;
use jetstream_replica::{Error as ReplicaError, ReplicaClient};
use jetstream_sql_types::SqlValue;

#[async_trait]
impl SecondarySink for ReplicaClient {
   fn is_active(&self) -> bool {
      self.is_enabled()
   }

   async fn apply(&self, stmt: &str, params: &[SqlValue]) -> Result<u64, ReplicaError> {
      self.execute_mutation(stmt, params).await
   }

   async fn copy_rows(
      &self,
      table: &str,
      columns: &[String],
      rows: &[Vec<SqlValue>],
      batch_size: usize,
   ) -> Result<u64, ReplicaError> {
      ReplicaClient::copy_rows(self, table, columns, rows, batch_size).await
   }
}

/// Sink used when the secondary store is disabled or misconfigured.
///
/// Never active, so the coordinator and bulk sync skip it without attempting
/// any connection.
#[derive(Debug, Default)]
pub struct DisabledSink;

#[async_trait]
impl SecondarySink for DisabledSink {
   fn is_active(&self) -> bool {
      false
   }

   async fn apply(&self, _stmt: &str, _params: &[SqlValue]) -> Result<u64, ReplicaError> {
      Err(ReplicaError::Disabled)
   }

   async fn copy_rows(
      &self,
      _table: &str,
      _columns: &[String],
      _rows: &[Vec<SqlValue>],
      _batch_size: usize,
   ) -> Result<u64, ReplicaError> {
      Err(ReplicaError::Disabled)
   }
}
