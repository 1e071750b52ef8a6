//! [`SqliteStore`], the SQLite implementation of [`KeyValueStore`].

use std::{
  path::Path,
  sync::{Mutex, MutexGuard, PoisonError},
};

use campus_core::storage::KeyValueStore;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _};

use crate::{
  Error, Result,
  schema::{SCHEMA, SCHEMA_VERSION},
};

/// A key-value store backed by a single SQLite file.
///
/// The connection sits behind a mutex; callers share the store through an
/// `Arc`.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = Connection::open(path)?;
    Self::init(conn)
  }

  /// Open an in-memory store, mostly for tests.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    Self::init(conn)
  }

  fn init(conn: Connection) -> Result<Self> {
    let found: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if found > SCHEMA_VERSION {
      return Err(Error::SchemaVersion { found, supported: SCHEMA_VERSION });
    }
    conn.execute_batch(SCHEMA)?;
    Ok(Self { conn: Mutex::new(conn) })
  }

  fn conn(&self) -> MutexGuard<'_, Connection> {
    self.conn.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Every stored key, sorted.
  pub fn keys(&self) -> Result<Vec<String>> {
    let conn = self.conn();
    let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
    let keys = stmt
      .query_map([], |row| row.get(0))?
      .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(keys)
  }
}

// ─── KeyValueStore impl ──────────────────────────────────────────────────────

impl KeyValueStore for SqliteStore {
  type Error = Error;

  fn get(&self, key: &str) -> Result<Option<String>> {
    let value = self
      .conn()
      .query_row("SELECT value FROM kv WHERE key = ?1", rusqlite::params![key], |r| r.get(0))
      .optional()?;
    Ok(value)
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    let at = Utc::now().to_rfc3339();
    self.conn().execute(
      "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
       ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
      rusqlite::params![key, value, at],
    )?;
    tracing::trace!(key, "kv row written");
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    self.conn().execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])?;
    Ok(())
  }
}
