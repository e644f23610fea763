//! # jetstream-replica
//!
//! PostgreSQL secondary-store plumbing for the jetstream replication layer.
//! The secondary is a best-effort replica: it receives the same mutations as
//! the primary for redundancy and migration purposes, but it is never
//! authoritative and its failures never surface to application callers.
//!
//! ## Core Types
//!
//! - **[`SecondaryPool`]**: bounded pool of live PostgreSQL connections with
//!   lazy validation and renewal
//! - **[`SecondaryPoolConfig`]**: pool sizing, URL, and timeout settings
//! - **[`ReplicaClient`]**: executes single statements with bounded retries,
//!   and bulk row copies inside per-table transactions
//! - **[`Error`]**: error type for secondary-store operations
//!
//! ## Connection discipline
//!
//! A connection is either in the pool (available) or checked out (owned by
//! exactly one caller), never both. Checked-out connections are validated with
//! a liveness probe under a short timeout; invalid connections are discarded
//! and replaced. When the pool is empty an ad hoc connection is opened rather
//! than blocking the caller. Released connections are probed again and pooled
//! only while capacity remains; everything else is closed.

mod client;
mod error;
mod pool;
mod retry;

// Re-export public types
pub use client::ReplicaClient;
pub use error::Error;
pub use pool::{SecondaryPool, SecondaryPoolConfig};

/// A type alias for Results with our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
