//! # jetstream-primary
//!
//! The embedded SQLite primary store for the jetstream replication layer.
//! The primary is the durable, always-authoritative store: all reads and the
//! first phase of every dual write go here.
//!
//! ## Core Types
//!
//! - **[`PrimaryStore`]**: main store type with separate read and write connection pools
//! - **[`PrimaryStoreConfig`]**: configuration for connection pool settings
//! - **[`WriteGuard`]**: RAII guard ensuring exclusive write access
//! - **[`Error`]**: error type for store operations
//!
//! ## Architecture
//!
//! - **Connection pooling**: separate read-only pool and a write pool capped at 1 connection
//! - **Lazy WAL mode**: Write-Ahead Logging enabled automatically on first write
//! - **Exclusive writes**: the single-connection write pool serializes write access,
//!   so concurrent dual-write callers never race on the SQLite handle
//! - **Concurrent reads**: multiple readers can query simultaneously via the read pool
//!
//! There is no global instance registry: each `connect` call constructs an
//! independent store that is passed explicitly to its collaborators.
//!
//! ## Usage
//!
//! ```no_run
//! use jetstream_primary::PrimaryStore;
//!
//! #[tokio::main]
//! async fn main() -> jetstream_primary::Result<()> {
//!     let store = PrimaryStore::connect("jetstream.db", None).await?;
//!
//!     // Use read_pool() for read queries (concurrent reads)
//!     let rows = sqlx::query("SELECT * FROM bookings")
//!         .fetch_all(store.read_pool()?)
//!         .await?;
//!
//!     // Acquire writer for write queries (exclusive)
//!     let mut writer = store.acquire_writer().await?;
//!     sqlx::query("INSERT INTO users (username) VALUES (?)")
//!         .bind("alice")
//!         .execute(&mut *writer)
//!         .await?;
//!
//!     store.close().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod store;
mod write_guard;

// Re-export public types
pub use config::PrimaryStoreConfig;
pub use error::Error;
pub use store::PrimaryStore;
pub use write_guard::WriteGuard;

/// A type alias for Results with our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
