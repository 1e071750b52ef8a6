//! SQLite backend for the campus persistent store.
//!
//! Each named document lives in one row of a key-value table, so the stores
//! in `campus-core` see the same load/save contract as origin-scoped browser
//! storage, but durable across restarts.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
