//! [`Campus`]: the application context handed to the presentation layer.
//!
//! It owns the three stores and the mailer, supplies the current session as
//! the acting user, and writes the broadcast notifications after each
//! committed event lifecycle change. Every call is synchronous; the broadcast
//! email comes back as a [`Dispatch`] for the caller to send once it has let
//! go of the campus.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
  Error, Result,
  account::{Account, ProfileUpdate},
  broadcast::{Dispatch, fan_out},
  catalog::EventCatalog,
  directory::UserDirectory,
  event::{CatalogStats, Event, EventDraft, EventPatch, EventQuery},
  feed::NotificationFeed,
  id::{AccountId, EventId, NotificationId},
  mailer::Mailer,
  notification::{NewNotification, Notification, NotificationKind},
  storage::{KeyValueStore, Persistent},
};

/// A member together with the events they attend.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MemberSummary {
  #[serde(flatten)]
  pub account: Account,
  pub events:  Vec<Event>,
}

pub struct Campus<K, M> {
  directory: UserDirectory<K>,
  catalog:   EventCatalog<K>,
  feed:      NotificationFeed<K>,
  mailer:    Arc<M>,
}

impl<K: KeyValueStore, M: Mailer> Campus<K, M> {
  /// Load all three stores from `backend`, seeding on first run.
  pub fn open(backend: Arc<K>, mailer: M) -> Result<Self> {
    let storage = Persistent::new(backend);
    Ok(Self {
      directory: UserDirectory::open(storage.clone())?,
      catalog: EventCatalog::open(storage.clone())?,
      feed: NotificationFeed::open(storage)?,
      mailer: Arc::new(mailer),
    })
  }

  pub fn directory(&self) -> &UserDirectory<K> { &self.directory }

  pub fn catalog(&self) -> &EventCatalog<K> { &self.catalog }

  pub fn feed(&self) -> &NotificationFeed<K> { &self.feed }

  pub fn mailer(&self) -> &M { &self.mailer }

  // ── Session ─────────────────────────────────────────────────────────────

  pub fn current_user(&self) -> Option<&Account> { self.directory.current() }

  pub fn login(&mut self, email: &str, password: &str) -> Result<Account> {
    self.directory.login(email, password)
  }

  pub fn admin_login(&mut self, email: &str, password: &str) -> Result<Account> {
    self.directory.admin_login(email, password)
  }

  pub fn register(&mut self, name: &str, email: &str, password: &str) -> Result<Account> {
    self.directory.register(name, email, password)
  }

  pub fn logout(&mut self) { self.directory.logout() }

  /// Edit the signed-in account's name or interests.
  pub fn update_profile(&mut self, update: ProfileUpdate) -> Result<Account> {
    let id = self.session()?.id.clone();
    self.directory.update_profile(&id, update)
  }

  // ── Events ──────────────────────────────────────────────────────────────

  /// Create an event and write its broadcast notifications. The returned
  /// [`Dispatch`] still has to be sent.
  pub fn add_event(&mut self, draft: EventDraft) -> Result<(Event, Dispatch<M>)> {
    let event = self.catalog.add(draft, self.directory.current())?;
    let dispatch = self.broadcast(&format!("New event created: {}", event.title), &event.id);
    Ok((event, dispatch))
  }

  pub fn update_event(&mut self, id: &EventId, patch: EventPatch) -> Result<(Event, Dispatch<M>)> {
    let event = self.catalog.update(id, patch, self.directory.current())?;
    let dispatch = self.broadcast(&format!("Event updated: {}", event.title), &event.id);
    Ok((event, dispatch))
  }

  pub fn delete_event(&mut self, id: &EventId) -> Result<(Event, Dispatch<M>)> {
    let removed = self.catalog.delete(id, self.directory.current())?;
    let dispatch = self.broadcast(&format!("Event deleted: {}", removed.title), &removed.id);
    Ok((removed, dispatch))
  }

  fn broadcast(&mut self, message: &str, event_id: &EventId) -> Dispatch<M> {
    fan_out(&self.directory, &mut self.feed, &self.mailer, message, event_id)
  }

  /// Register the signed-in account and leave it a private notification.
  pub fn register_for_event(&mut self, id: &EventId) -> Result<Event> {
    let event = self.catalog.register_attendee(id, self.directory.current())?;
    self.notify_self(format!("You have registered for {}", event.title), &event.id);
    Ok(event)
  }

  pub fn unregister_from_event(&mut self, id: &EventId) -> Result<Event> {
    let event = self.catalog.unregister_attendee(id, self.directory.current())?;
    self.notify_self(format!("You have unregistered from {}", event.title), &event.id);
    Ok(event)
  }

  fn notify_self(&mut self, message: String, event_id: &EventId) {
    let Some(user) = self.directory.current() else { return };
    let input = NewNotification::new(user.id.clone(), message, NotificationKind::Event)
      .about(event_id.clone());
    if let Err(e) = self.feed.add(input) {
      tracing::warn!(event = %event_id, error = %e, "failed to write attendance notification");
    }
  }

  pub fn get_event(&self, id: &EventId) -> Option<&Event> { self.catalog.get(id) }

  pub fn list_events(&self, query: &EventQuery) -> Vec<&Event> { self.catalog.search(query) }

  pub fn events_on(&self, date: NaiveDate) -> Vec<&Event> { self.catalog.on_date(date) }

  pub fn categories(&self) -> Vec<&str> { self.catalog.categories() }

  /// Events the signed-in account attends; empty without a session.
  pub fn my_events(&self) -> Vec<&Event> {
    match self.directory.current() {
      Some(user) => self.catalog.list_for_user(&user.id),
      None => Vec::new(),
    }
  }

  // ── Notifications ───────────────────────────────────────────────────────

  pub fn add_notification(&mut self, input: NewNotification) -> Result<Notification> {
    self.feed.add(input)
  }

  /// The signed-in account's notifications.
  pub fn notifications(&self) -> Result<Vec<&Notification>> {
    let user = self.session()?;
    Ok(self.feed.list_for_user(&user.id))
  }

  pub fn unread_count(&self) -> Result<usize> {
    let user = self.session()?;
    Ok(self.feed.unread_count_for_user(&user.id))
  }

  pub fn mark_as_read(&mut self, id: &NotificationId) -> Result<()> {
    self.check_owner(id)?;
    self.feed.mark_read(id)
  }

  pub fn mark_all_as_read(&mut self) -> Result<()> {
    let id = self.session()?.id.clone();
    self.feed.mark_all_read(&id)
  }

  pub fn delete_notification(&mut self, id: &NotificationId) -> Result<()> {
    self.check_owner(id)?;
    self.feed.delete(id)
  }

  /// Absent ids pass; the feed treats them as no-ops.
  fn check_owner(&self, id: &NotificationId) -> Result<()> {
    let user = self.session()?;
    match self.feed.get(id) {
      Some(n) if n.user_id != user.id => Err(Error::NotAuthorized),
      _ => Ok(()),
    }
  }

  // ── Administration ──────────────────────────────────────────────────────

  /// Members (optionally filtered) with the events each one attends.
  pub fn members(&self, search: Option<&str>) -> Result<Vec<MemberSummary>> {
    self.require_admin()?;
    Ok(
      self
        .directory
        .members(search)
        .into_iter()
        .map(|account| MemberSummary {
          events: self.catalog.list_for_user(&account.id).into_iter().cloned().collect(),
          account,
        })
        .collect(),
    )
  }

  pub fn member_events(&self, user_id: &AccountId) -> Result<Vec<&Event>> {
    self.require_admin()?;
    if self.directory.get(user_id).is_none() {
      return Err(Error::AccountNotFound(user_id.clone()));
    }
    Ok(self.catalog.list_for_user(user_id))
  }

  pub fn stats(&self, today: NaiveDate) -> Result<CatalogStats> {
    self.require_admin()?;
    Ok(self.catalog.stats(today))
  }

  // ── Guards ──────────────────────────────────────────────────────────────

  fn session(&self) -> Result<&Account> { self.directory.current().ok_or(Error::NotAuthenticated) }

  fn require_admin(&self) -> Result<&Account> {
    let user = self.session()?;
    if user.is_admin { Ok(user) } else { Err(Error::NotAuthorized) }
  }
}
