//! Per-user notification records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::id::{AccountId, EventId, NotificationId};

/// What a notification is about.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
  Event,
  System,
  Social,
}

/// A message addressed to a single account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
  pub id:               NotificationId,
  pub user_id:          AccountId,
  pub message:          String,
  #[serde(rename = "type")]
  pub kind:             NotificationKind,
  #[serde(default)]
  pub read:             bool,
  /// Assigned by the feed at creation; never changes.
  pub created_at:       DateTime<Utc>,
  /// A lookup hint, not an ownership link. The event may since have been
  /// deleted, in which case the link is simply unavailable.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub related_event_id: Option<EventId>,
}

/// Input to [`crate::feed::NotificationFeed::add`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
  pub user_id:          AccountId,
  pub message:          String,
  #[serde(rename = "type")]
  pub kind:             NotificationKind,
  #[serde(default)]
  pub related_event_id: Option<EventId>,
}

impl NewNotification {
  pub fn new(user_id: AccountId, message: impl Into<String>, kind: NotificationKind) -> Self {
    Self { user_id, message: message.into(), kind, related_event_id: None }
  }

  pub fn about(mut self, event_id: EventId) -> Self {
    self.related_event_id = Some(event_id);
    self
  }
}
