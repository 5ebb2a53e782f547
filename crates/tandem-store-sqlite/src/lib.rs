//! SQLite backend for the Tandem snapshot cache.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. The database file is the
//! cross-process boundary between the single writing repository and any
//! number of renderer-side readers.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteSnapshotStore;

#[cfg(test)]
mod tests;
