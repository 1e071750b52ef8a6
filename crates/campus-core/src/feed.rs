//! [`NotificationFeed`]: per-user notifications and their read state.

use chrono::Utc;

use crate::{
  Error, Result,
  id::{AccountId, EventId, NotificationId},
  notification::{NewNotification, Notification, NotificationKind},
  storage::{KeyValueStore, Persistent, keys},
};

/// First-run notifications for the seeded member: a welcome plus two
/// registration notices whose events are not in the catalog.
fn seed_notifications() -> Vec<Notification> {
  let seed = |id: &str, message: &str, kind, related: Option<&str>| Notification {
    id: id.into(),
    user_id: "user-1".into(),
    message: message.into(),
    kind,
    read: false,
    created_at: Utc::now(),
    related_event_id: related.map(EventId::from),
  };
  vec![
    seed("notif-1", "Welcome to School Events App!", NotificationKind::System, None),
    seed(
      "notif-2",
      "You have registered for the Annual Science Fair",
      NotificationKind::Event,
      Some("event-1"),
    ),
    seed(
      "notif-3",
      "You have registered for the Music Concert",
      NotificationKind::Event,
      Some("event-3"),
    ),
  ]
}

pub struct NotificationFeed<K> {
  storage:       Persistent<K>,
  notifications: Vec<Notification>,
}

impl<K: KeyValueStore> NotificationFeed<K> {
  pub fn open(storage: Persistent<K>) -> Result<Self> {
    let notifications = match storage.load(keys::NOTIFICATIONS)? {
      Some(notifications) => notifications,
      None => {
        let seeded = seed_notifications();
        storage.save(keys::NOTIFICATIONS, &seeded)?;
        seeded
      }
    };
    Ok(Self { storage, notifications })
  }

  /// Record a notification, assigning its id and creation time.
  pub fn add(&mut self, input: NewNotification) -> Result<Notification> {
    if input.user_id.is_empty() {
      return Err(Error::MissingRecipient);
    }
    let notification = Notification {
      id:               NotificationId::generate(),
      user_id:          input.user_id,
      message:          input.message,
      kind:             input.kind,
      read:             false,
      created_at:       Utc::now(),
      related_event_id: input.related_event_id,
    };

    let mut notifications = self.notifications.clone();
    notifications.push(notification.clone());
    self.commit(notifications)?;
    Ok(notification)
  }

  /// Mark one notification read. Unknown ids are ignored.
  pub fn mark_read(&mut self, id: &NotificationId) -> Result<()> {
    let Some(index) = self.notifications.iter().position(|n| &n.id == id) else {
      return Ok(());
    };
    let mut notifications = self.notifications.clone();
    notifications[index].read = true;
    self.commit(notifications)
  }

  /// Mark every notification owned by `user_id` read, with a single write.
  pub fn mark_all_read(&mut self, user_id: &AccountId) -> Result<()> {
    let mut notifications = self.notifications.clone();
    notifications
      .iter_mut()
      .filter(|n| &n.user_id == user_id)
      .for_each(|n| n.read = true);
    self.commit(notifications)
  }

  /// Remove one notification. Unknown ids are ignored.
  pub fn delete(&mut self, id: &NotificationId) -> Result<()> {
    if !self.notifications.iter().any(|n| &n.id == id) {
      return Ok(());
    }
    let notifications = self.notifications.iter().filter(|n| &n.id != id).cloned().collect();
    self.commit(notifications)
  }

  pub fn get(&self, id: &NotificationId) -> Option<&Notification> {
    self.notifications.iter().find(|n| &n.id == id)
  }

  /// Notifications addressed to `user_id`, in creation order.
  pub fn list_for_user(&self, user_id: &AccountId) -> Vec<&Notification> {
    self.notifications.iter().filter(|n| &n.user_id == user_id).collect()
  }

  pub fn unread_count_for_user(&self, user_id: &AccountId) -> usize {
    self.notifications.iter().filter(|n| &n.user_id == user_id && !n.read).count()
  }

  fn commit(&mut self, notifications: Vec<Notification>) -> Result<()> {
    self.storage.save(keys::NOTIFICATIONS, &notifications)?;
    self.notifications = notifications;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::storage::MemoryStore;

  fn feed() -> NotificationFeed<MemoryStore> {
    NotificationFeed::open(Persistent::new(Arc::new(MemoryStore::new()))).unwrap()
  }

  fn note(user: &str, message: &str) -> NewNotification {
    NewNotification::new(user.into(), message, NotificationKind::Social)
  }

  #[test]
  fn first_run_seeds_notifications_for_seed_member() {
    let feed = feed();
    let john = AccountId::from("user-1");
    let list = feed.list_for_user(&john);
    let ids: Vec<_> = list.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["notif-1", "notif-2", "notif-3"]);
    assert_eq!(list[0].kind, NotificationKind::System);
    assert_eq!(list[0].related_event_id, None);
    assert_eq!(list[1].related_event_id, Some(EventId::from("event-1")));
    assert_eq!(list[2].kind, NotificationKind::Event);
    assert_eq!(feed.unread_count_for_user(&john), 3);
  }

  #[test]
  fn reopen_does_not_reseed() {
    let backend = Arc::new(MemoryStore::new());
    let mut feed = NotificationFeed::open(Persistent::new(backend.clone())).unwrap();
    feed.delete(&"notif-2".into()).unwrap();
    let feed = NotificationFeed::open(Persistent::new(backend)).unwrap();
    assert_eq!(feed.list_for_user(&"user-1".into()).len(), 2);
  }

  #[test]
  fn add_assigns_id_and_is_visible_only_to_owner() {
    let mut feed = feed();
    let n = feed.add(note("user-2", "hello").about("event-9".into())).unwrap();
    assert!(n.id.as_str().starts_with("notif-"));
    assert!(!n.read);
    assert_eq!(feed.list_for_user(&"user-2".into()), vec![&n]);
    assert!(feed.list_for_user(&"user-3".into()).is_empty());
  }

  #[test]
  fn empty_recipient_is_rejected() {
    let mut feed = feed();
    assert!(matches!(feed.add(note("", "nobody")), Err(Error::MissingRecipient)));
  }

  #[test]
  fn mark_read_and_mark_all_read() {
    let mut feed = feed();
    let a = feed.add(note("user-2", "a")).unwrap();
    feed.add(note("user-2", "b")).unwrap();
    feed.add(note("user-3", "c")).unwrap();

    feed.mark_read(&a.id).unwrap();
    assert_eq!(feed.unread_count_for_user(&"user-2".into()), 1);

    feed.mark_read(&"notif-missing".into()).unwrap();

    feed.mark_all_read(&"user-2".into()).unwrap();
    assert_eq!(feed.unread_count_for_user(&"user-2".into()), 0);
    assert_eq!(feed.unread_count_for_user(&"user-3".into()), 1);
  }

  #[test]
  fn delete_removes_only_target() {
    let mut feed = feed();
    let a = feed.add(note("user-2", "a")).unwrap();
    let b = feed.add(note("user-2", "b")).unwrap();
    feed.delete(&a.id).unwrap();
    feed.delete(&a.id).unwrap();
    assert_eq!(feed.list_for_user(&"user-2".into()), vec![&b]);
  }
}
