//! Events, drafts, patches and catalog queries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  account::Account,
  id::{AccountId, EventId},
};

// ─── Event ───────────────────────────────────────────────────────────────────

/// A school activity with schedule, location and category metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  pub id:          EventId,
  pub title:       String,
  pub description: String,
  /// Calendar date; serialised as `YYYY-MM-DD`.
  pub date:        NaiveDate,
  /// Free-text time range, e.g. "10:00 AM - 2:00 PM".
  pub time:        String,
  pub location:    String,
  pub category:    String,
  pub organizer:   String,
  /// Creator's account id; never changes after creation.
  pub created_by:  AccountId,
  pub image_url:   String,
  /// Registered account ids, duplicate-free, in registration order.
  #[serde(default)]
  pub attendees:   Vec<AccountId>,
}

impl Event {
  pub(crate) fn from_draft(draft: EventDraft, created_by: AccountId) -> Self {
    Self {
      id: EventId::generate(),
      title: draft.title,
      description: draft.description,
      date: draft.date,
      time: draft.time,
      location: draft.location,
      category: draft.category,
      organizer: draft.organizer,
      created_by,
      image_url: draft.image_url,
      attendees: Vec::new(),
    }
  }

  pub fn is_attending(&self, user_id: &AccountId) -> bool {
    self.attendees.contains(user_id)
  }

  /// Creator or administrator.
  pub fn may_be_modified_by(&self, actor: &Account) -> bool {
    actor.is_admin || self.created_by == actor.id
  }
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// Input to [`crate::catalog::EventCatalog::add`]. The id, creator and
/// attendee list are assigned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
  pub title:       String,
  pub description: String,
  pub date:        NaiveDate,
  pub time:        String,
  pub location:    String,
  pub category:    String,
  pub organizer:   String,
  pub image_url:   String,
}

// ─── Patch ───────────────────────────────────────────────────────────────────

/// A field-level update: every present field overwrites, absent fields stay.
///
/// The creator and attendee list are not patchable; attendance changes go
/// through register/unregister.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub date:        Option<NaiveDate>,
  pub time:        Option<String>,
  pub location:    Option<String>,
  pub category:    Option<String>,
  pub organizer:   Option<String>,
  pub image_url:   Option<String>,
}

impl EventPatch {
  pub fn apply(self, event: &mut Event) {
    fn set<T>(slot: &mut T, value: Option<T>) {
      if let Some(v) = value {
        *slot = v;
      }
    }
    set(&mut event.title, self.title);
    set(&mut event.description, self.description);
    set(&mut event.date, self.date);
    set(&mut event.time, self.time);
    set(&mut event.location, self.location);
    set(&mut event.category, self.category);
    set(&mut event.organizer, self.organizer);
    set(&mut event.image_url, self.image_url);
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Filter for [`crate::catalog::EventCatalog::search`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQuery {
  /// Case-insensitive substring over title, description, location,
  /// organizer and category.
  pub text:     Option<String>,
  /// Exact category match.
  pub category: Option<String>,
}

impl EventQuery {
  pub fn matches(&self, event: &Event) -> bool {
    let text_ok = match self.text.as_deref().map(str::trim) {
      None | Some("") => true,
      Some(text) => {
        let needle = text.to_lowercase();
        [
          &event.title,
          &event.description,
          &event.location,
          &event.organizer,
          &event.category,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
      }
    };
    let category_ok = match self.category.as_deref() {
      None | Some("") => true,
      Some(category) => event.category == category,
    };
    text_ok && category_ok
  }
}

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Dashboard summary over the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
  pub total_events:    usize,
  /// Events dated today or later.
  pub upcoming_events: usize,
  /// At most five `(category, count)` pairs, most frequent first.
  pub top_categories:  Vec<(String, usize)>,
}
