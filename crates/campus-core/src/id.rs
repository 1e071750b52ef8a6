//! String identifiers for accounts, events and notifications.
//!
//! Ids are opaque strings so that seeded records (`admin-1`, `user-1`) and
//! documents written by earlier versions keep working. Freshly minted ids
//! carry a kind prefix and a random UUID.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
  ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
    $(#[$meta])*
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct $name(String);

    impl $name {
      /// Mint a fresh, globally unique id.
      pub fn generate() -> Self {
        Self(format!(concat!($prefix, "-{}"), Uuid::new_v4().simple()))
      }

      pub fn as_str(&self) -> &str { &self.0 }

      pub fn is_empty(&self) -> bool { self.0.is_empty() }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
      }
    }

    impl From<String> for $name {
      fn from(s: String) -> Self { Self(s) }
    }

    impl From<&str> for $name {
      fn from(s: &str) -> Self { Self(s.to_owned()) }
    }

    impl AsRef<str> for $name {
      fn as_ref(&self) -> &str { &self.0 }
    }
  };
}

string_id!(
  /// Identifies an [`Account`](crate::account::Account).
  AccountId,
  "user"
);

string_id!(
  /// Identifies an [`Event`](crate::event::Event).
  EventId,
  "event"
);

string_id!(
  /// Identifies a [`Notification`](crate::notification::Notification).
  NotificationId,
  "notif"
);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn generated_ids_carry_prefix_and_differ() {
    let a = EventId::generate();
    let b = EventId::generate();
    assert!(a.as_str().starts_with("event-"));
    assert_ne!(a, b);
    assert!(NotificationId::generate().as_str().starts_with("notif-"));
    assert!(AccountId::generate().as_str().starts_with("user-"));
  }

  #[test]
  fn serializes_as_bare_string() {
    let id = AccountId::from("user-1");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"user-1\"");
    let back: AccountId = serde_json::from_str("\"admin-1\"").unwrap();
    assert_eq!(back.as_str(), "admin-1");
  }
}
