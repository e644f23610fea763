//! Configuration for primary store connection pools

use serde::{Deserialize, Serialize};

/// Configuration for [`crate::PrimaryStore`] connection pools
///
/// # Examples
///
/// ```
/// use jetstream_primary::PrimaryStoreConfig;
///
/// // Use defaults
/// let config = PrimaryStoreConfig::default();
///
/// // Override just one field
/// let config = PrimaryStoreConfig {
///     max_read_connections: 3,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryStoreConfig {
   /// Maximum number of concurrent read connections
   ///
   /// This controls the size of the read-only connection pool.
   /// Higher values allow more concurrent read queries but consume more resources.
   ///
   /// Default: 6
   pub max_read_connections: u32,

   /// Idle timeout for both read and write connections (in seconds)
   ///
   /// Connections that remain idle for this duration will be closed automatically.
   ///
   /// Default: 30
   pub idle_timeout_secs: u64,
}

impl Default for PrimaryStoreConfig {
   fn default() -> Self {
      Self {
         max_read_connections: 6,
         idle_timeout_secs: 30,
      }
   }
}
