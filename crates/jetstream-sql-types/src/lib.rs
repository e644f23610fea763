//! Typed SQL parameter values shared by the jetstream primary and replica backends.
//!
//! A mutation in the replication layer is a statement template plus an ordered
//! list of [`SqlValue`]s. The same value list binds deterministically against
//! both the SQLite primary and the PostgreSQL secondary, which is what makes
//! dual-write "apply the identical mutation to both stores" possible.
//!
//! ## Core pieces
//!
//! - **[`SqlValue`]**: tagged parameter value (null/integer/real/text/blob)
//! - **[`bind_sqlite`] / [`bind_pg`]**: bind a value to a query for either backend
//! - **[`decode_row`] / [`row_to_map`]**: decode SQLite result rows back into values
//! - **[`Error`]**: error type for unsupported datatypes

mod bind;
mod decode;
mod error;
mod value;

pub use bind::{bind_all_pg, bind_all_sqlite, bind_pg, bind_sqlite};
pub use decode::{decode_row, decode_value, row_to_map};
pub use error::Error;
pub use value::SqlValue;

/// A type alias for Results with our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
