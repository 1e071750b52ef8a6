//! The persistent store: named JSON documents over a key-value backend.
//!
//! Backends implement [`KeyValueStore`] and deal in raw strings.
//! [`Persistent`] layers typed JSON load/save on top and is what the stores
//! hold. A save fully replaces the previous document; there are no partial
//! writes and no transactions.

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{Arc, Mutex, PoisonError},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result};

/// Document keys. Kept identical to the browser-origin storage keys of the
/// web client so exported documents load unchanged.
pub mod keys {
  pub const ACCOUNTS: &str = "school_events_users";
  pub const SESSION: &str = "school_events_current_user";
  pub const EVENTS: &str = "school_events_data";
  pub const NOTIFICATIONS: &str = "school_events_notifications";
}

// ─── Backend trait ───────────────────────────────────────────────────────────

/// Durable string-to-string storage scoped to one application instance.
///
/// Methods take `&self`; backends provide their own interior mutability so a
/// single backend can be shared by every store.
pub trait KeyValueStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value under `key`. An absent key is `Ok(None)`, not an error.
  fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

  /// Replace the value under `key`.
  fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

  /// Remove `key`; removing an absent key succeeds.
  fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A process-local backend. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl KeyValueStore for MemoryStore {
  type Error = Infallible;

  fn get(&self, key: &str) -> Result<Option<String>, Infallible> {
    Ok(self.entries().get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<(), Infallible> {
    self.entries().insert(key.to_owned(), value.to_owned());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<(), Infallible> {
    self.entries().remove(key);
    Ok(())
  }
}

// ─── Typed JSON layer ────────────────────────────────────────────────────────

/// Typed JSON documents over a shared backend.
///
/// Cloning is cheap; every clone writes to the same backend.
#[derive(Debug)]
pub struct Persistent<K> {
  backend: Arc<K>,
}

impl<K> Clone for Persistent<K> {
  fn clone(&self) -> Self { Self { backend: Arc::clone(&self.backend) } }
}

impl<K: KeyValueStore> Persistent<K> {
  pub fn new(backend: Arc<K>) -> Self { Self { backend } }

  pub fn backend(&self) -> &Arc<K> { &self.backend }

  /// Load and deserialise the document under `key`; `None` if absent.
  pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
    let raw = self.backend.get(key).map_err(storage_error)?;
    raw.map(|s| serde_json::from_str(&s)).transpose().map_err(Error::from)
  }

  /// Serialise `value` and replace the document under `key`.
  pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    self.backend.set(key, &raw).map_err(storage_error)?;
    tracing::debug!(key, bytes = raw.len(), "document saved");
    Ok(())
  }

  /// Remove the document under `key`.
  pub fn clear(&self, key: &str) -> Result<()> {
    self.backend.remove(key).map_err(storage_error)
  }
}

fn storage_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  Error::Storage(Box::new(e))
}
