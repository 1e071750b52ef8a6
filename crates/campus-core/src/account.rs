//! Accounts and the password-free projection handed to callers.

use serde::{Deserialize, Serialize};

use crate::id::AccountId;

// ─── Stored record ───────────────────────────────────────────────────────────

/// An account as persisted in the directory document.
///
/// The password is an opaque string compared verbatim. It never leaves the
/// directory: everything returned to callers is an [`Account`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
  pub id:        AccountId,
  pub name:      String,
  /// Unique within the directory; matched case-sensitively.
  pub email:     String,
  pub password:  String,
  /// Only set on seeded accounts; registration always creates members.
  pub is_admin:  bool,
  #[serde(default)]
  pub interests: Vec<String>,
}

impl AccountRecord {
  /// The projection of this record with the password stripped.
  pub fn projection(&self) -> Account {
    Account {
      id:        self.id.clone(),
      name:      self.name.clone(),
      email:     self.email.clone(),
      is_admin:  self.is_admin,
      interests: self.interests.clone(),
    }
  }

  pub(crate) fn matches_credentials(&self, email: &str, password: &str) -> bool {
    self.email == email && self.password == password
  }
}

// ─── Projection ──────────────────────────────────────────────────────────────

/// A registered person, student or administrator, without credentials.
///
/// This is also the shape of the persisted session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
  pub id:        AccountId,
  pub name:      String,
  pub email:     String,
  pub is_admin:  bool,
  #[serde(default)]
  pub interests: Vec<String>,
}

// ─── Profile edits ───────────────────────────────────────────────────────────

/// Field-optional profile edit; only supplied fields change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
  pub name:      Option<String>,
  pub interests: Option<Vec<String>>,
}

impl ProfileUpdate {
  pub(crate) fn apply(self, record: &mut AccountRecord) {
    if let Some(name) = self.name {
      record.name = name;
    }
    if let Some(interests) = self.interests {
      record.interests = interests;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record() -> AccountRecord {
    AccountRecord {
      id:        "user-1".into(),
      name:      "John Student".into(),
      email:     "john@school.edu".into(),
      password:  "password123".into(),
      is_admin:  false,
      interests: vec!["Sports".into()],
    }
  }

  #[test]
  fn projection_has_no_password_field() {
    let json = serde_json::to_value(record().projection()).unwrap();
    assert!(json.get("password").is_none());
    assert_eq!(json["isAdmin"], false);
    assert_eq!(json["email"], "john@school.edu");
  }

  #[test]
  fn missing_interests_default_to_empty() {
    let raw = r#"{"id":"admin-1","name":"Admin User","email":"admin@school.edu",
                  "password":"admin123","isAdmin":true}"#;
    let rec: AccountRecord = serde_json::from_str(raw).unwrap();
    assert!(rec.interests.is_empty());
    assert!(rec.is_admin);
  }

  #[test]
  fn profile_update_only_touches_supplied_fields() {
    let mut rec = record();
    ProfileUpdate { name: None, interests: Some(vec!["Music".into()]) }.apply(&mut rec);
    assert_eq!(rec.name, "John Student");
    assert_eq!(rec.interests, vec!["Music".to_string()]);
  }
}
