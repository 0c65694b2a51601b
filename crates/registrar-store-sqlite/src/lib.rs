//! SQLite backend for the Registrar academic store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Serialising every statement
//! through that one connection also means no two writers can interleave an
//! attempt-number read with a write for the same ledger key.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{SqliteStore, StoreOptions};

#[cfg(test)]
mod tests;
