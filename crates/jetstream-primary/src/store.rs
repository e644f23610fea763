//! SQLite primary store with connection pooling and exclusive write access

use crate::Result;
use crate::config::PrimaryStoreConfig;
use crate::error::Error;
use crate::write_guard::WriteGuard;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{ConnectOptions, Pool, Sqlite};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// The authoritative SQLite store with connection pooling for concurrent reads
/// and exclusive serialized writes.
///
/// Once the store is opened it can be used for read-only operations by calling
/// `read_pool()`. Write operations are available by calling `acquire_writer()`
/// which lazily initializes WAL mode on first use.
///
/// # Example
///
/// ```no_run
/// use jetstream_primary::PrimaryStore;
///
/// # async fn example() -> Result<(), jetstream_primary::Error> {
/// let store = PrimaryStore::connect("jetstream.db", None).await?;
///
/// // Use read_pool for SELECT queries (concurrent reads)
/// let rows = sqlx::query("SELECT * FROM flights")
///     .fetch_all(store.read_pool()?)
///     .await?;
///
/// // Acquire writer for INSERT/UPDATE/DELETE (exclusive)
/// let mut writer = store.acquire_writer().await?;
/// sqlx::query("INSERT INTO flights (flight_no) VALUES (?)")
///     .bind("JS101")
///     .execute(&mut *writer)
///     .await?;
///
/// store.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PrimaryStore {
   /// Pool of read-only connections (defaults to max_connections=6) for concurrent reads
   read_pool: Pool<Sqlite>,

   /// Single read-write connection pool (max_connections=1) for serialized writes
   write_conn: Pool<Sqlite>,

   /// Tracks if WAL mode has been initialized (set on first write)
   wal_initialized: AtomicBool,

   /// Marks store as closed to prevent further operations
   closed: AtomicBool,

   /// Path to the store file
   path: PathBuf,
}

fn is_memory_database(path: &Path) -> bool {
   path.as_os_str() == ":memory:"
}

impl PrimaryStore {
   /// Connect to the primary store file
   ///
   /// The store file is created if it doesn't exist. WAL mode is enabled when
   /// `acquire_writer()` is first called.
   ///
   /// Each call constructs an independent instance; callers share one store by
   /// cloning the returned `Arc`.
   ///
   /// # Arguments
   ///
   /// * `path` - Path to the SQLite store file (will be created if missing)
   /// * `custom_config` - Optional custom configuration for connection pools.
   ///   Pass `None` to use defaults (6 max read connections, 30 second idle timeout).
   pub async fn connect(
      path: impl AsRef<Path>,
      custom_config: Option<PrimaryStoreConfig>,
   ) -> Result<Arc<Self>> {
      let config = custom_config.unwrap_or_default();
      let path = path.as_ref();

      if path.as_os_str().is_empty() {
         return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Store path cannot be empty",
         )));
      }

      let path = path.to_path_buf();

      // If the store file doesn't exist and isn't :memory:, create it with a
      // temporary connection. We can't rely on `create_if_missing` because the
      // first query may come from the read pool, whose read-only connections
      // cannot create the file.
      if !path.exists() && !is_memory_database(&path) {
         let create_options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .read_only(false);

         let conn = create_options.connect().await?;
         drop(conn); // Close immediately after creating the file
      }

      // Create read pool with read-only connections
      let read_options = SqliteConnectOptions::new().filename(&path).read_only(true);

      let read_pool = SqlitePoolOptions::new()
         .max_connections(config.max_read_connections)
         .min_connections(0)
         .idle_timeout(Some(std::time::Duration::from_secs(
            config.idle_timeout_secs,
         )))
         .connect_with(read_options)
         .await?;

      // Create write pool with a single read-write connection
      let write_options = SqliteConnectOptions::new().filename(&path).read_only(false);

      let write_conn = SqlitePoolOptions::new()
         .max_connections(1)
         .min_connections(0)
         .idle_timeout(Some(std::time::Duration::from_secs(
            config.idle_timeout_secs,
         )))
         .connect_with(write_options)
         .await?;

      debug!(path = %path.display(), "primary store opened");

      Ok(Arc::new(Self {
         read_pool,
         write_conn,
         wal_initialized: AtomicBool::new(false),
         closed: AtomicBool::new(false),
         path,
      }))
   }

   /// Get a reference to the connection pool for executing read queries
   ///
   /// Use this for concurrent read operations. Multiple readers can access
   /// the pool simultaneously. All application reads are served here; the
   /// secondary store is never consulted on the read path.
   pub fn read_pool(&self) -> Result<&Pool<Sqlite>> {
      if self.closed.load(Ordering::SeqCst) {
         return Err(Error::StoreClosed);
      }
      Ok(&self.read_pool)
   }

   /// Acquire exclusive write access to the store
   ///
   /// This method returns a `WriteGuard` that provides exclusive access to
   /// the single write connection. Only one writer can exist at a time.
   ///
   /// On the first call, this method will enable WAL mode on the store.
   /// Subsequent calls reuse the same write connection.
   pub async fn acquire_writer(&self) -> Result<WriteGuard> {
      if self.closed.load(Ordering::SeqCst) {
         return Err(Error::StoreClosed);
      }

      // Acquire connection from pool (max=1 ensures exclusive access)
      let mut conn = self.write_conn.acquire().await?;

      // Initialize WAL mode on first use (idempotent and safe)
      if !self.wal_initialized.load(Ordering::SeqCst) {
         sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&mut *conn)
            .await?;

         // https://www.sqlite.org/wal.html#performance_considerations
         sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&mut *conn)
            .await?;

         self.wal_initialized.store(true, Ordering::SeqCst);
      }

      Ok(WriteGuard::new(conn))
   }

   /// Path to the store file
   pub fn path(&self) -> &Path {
      &self.path
   }

   /// Close the store and clean up resources
   ///
   /// This closes all connections in the pools. After calling close, any
   /// operations on this store will return `Error::StoreClosed`.
   ///
   /// Note: Takes `Arc<Self>` to consume ownership, preventing use-after-close
   /// at compile time for the caller that initiates the shutdown.
   pub async fn close(self: Arc<Self>) -> Result<()> {
      // Mark as closed
      self.closed.store(true, Ordering::SeqCst);

      // This will await all readers to be returned
      self.read_pool.close().await;

      // Checkpoint WAL before closing the write connection to flush changes and truncate WAL file
      // Only attempt if WAL was initialized (write connection was used)
      if self.wal_initialized.load(Ordering::SeqCst)
         && let Ok(mut conn) = self.write_conn.acquire().await
      {
         let _ = sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&mut *conn)
            .await;
      }

      self.write_conn.close().await;

      Ok(())
   }
}
