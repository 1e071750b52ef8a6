//! [`EventCatalog`]: the event collection, its permission rules and
//! attendee lists.
//!
//! The catalog never broadcasts by itself; [`crate::Campus`] runs the
//! fan-out after a create, update or delete has been committed.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::{
  Error, Result,
  account::Account,
  event::{CatalogStats, Event, EventDraft, EventPatch, EventQuery},
  id::{AccountId, EventId},
  storage::{KeyValueStore, Persistent, keys},
};

const TOP_CATEGORIES: usize = 5;

/// Owns the event collection.
///
/// Mutations are whole-collection read-modify-write: the new collection is
/// computed, saved, and only then swapped in.
pub struct EventCatalog<K> {
  storage: Persistent<K>,
  events:  Vec<Event>,
}

impl<K: KeyValueStore> EventCatalog<K> {
  pub fn open(storage: Persistent<K>) -> Result<Self> {
    let events = storage.load(keys::EVENTS)?.unwrap_or_default();
    Ok(Self { storage, events })
  }

  // ── Lifecycle ───────────────────────────────────────────────────────────

  /// Create an event owned by `actor`.
  pub fn add(&mut self, draft: EventDraft, actor: Option<&Account>) -> Result<Event> {
    let actor = actor.ok_or(Error::NotAuthenticated)?;
    let event = Event::from_draft(draft, actor.id.clone());

    let mut events = self.events.clone();
    events.push(event.clone());
    self.commit(events)?;

    tracing::info!(event = %event.id, user = %actor.id, "event created");
    Ok(event)
  }

  /// Merge `patch` into an event. Only its creator or an administrator may.
  pub fn update(&mut self, id: &EventId, patch: EventPatch, actor: Option<&Account>) -> Result<Event> {
    let actor = actor.ok_or(Error::NotAuthenticated)?;
    let index = self.index_of(id)?;
    if !self.events[index].may_be_modified_by(actor) {
      return Err(Error::NotAuthorized);
    }

    let mut events = self.events.clone();
    patch.apply(&mut events[index]);
    let updated = events[index].clone();
    self.commit(events)?;

    tracing::info!(event = %id, user = %actor.id, "event updated");
    Ok(updated)
  }

  /// Remove an event and return it as it was before removal.
  pub fn delete(&mut self, id: &EventId, actor: Option<&Account>) -> Result<Event> {
    let actor = actor.ok_or(Error::NotAuthenticated)?;
    let index = self.index_of(id)?;
    if !self.events[index].may_be_modified_by(actor) {
      return Err(Error::NotAuthorized);
    }

    let mut events = self.events.clone();
    let removed = events.remove(index);
    self.commit(events)?;

    tracing::info!(event = %id, user = %actor.id, "event deleted");
    Ok(removed)
  }

  // ── Attendance ──────────────────────────────────────────────────────────

  /// Add `actor` to the attendee list.
  pub fn register_attendee(&mut self, id: &EventId, actor: Option<&Account>) -> Result<Event> {
    let actor = actor.ok_or(Error::NotAuthenticated)?;
    let index = self.index_of(id)?;
    if self.events[index].is_attending(&actor.id) {
      return Err(Error::AlreadyRegistered(id.clone()));
    }

    let mut events = self.events.clone();
    events[index].attendees.push(actor.id.clone());
    let event = events[index].clone();
    self.commit(events)?;

    tracing::info!(event = %id, user = %actor.id, "attendee registered");
    Ok(event)
  }

  /// Remove `actor` from the attendee list.
  pub fn unregister_attendee(&mut self, id: &EventId, actor: Option<&Account>) -> Result<Event> {
    let actor = actor.ok_or(Error::NotAuthenticated)?;
    let index = self.index_of(id)?;
    if !self.events[index].is_attending(&actor.id) {
      return Err(Error::NotRegistered(id.clone()));
    }

    let mut events = self.events.clone();
    events[index].attendees.retain(|a| a != &actor.id);
    let event = events[index].clone();
    self.commit(events)?;

    tracing::info!(event = %id, user = %actor.id, "attendee unregistered");
    Ok(event)
  }

  // ── Reads ───────────────────────────────────────────────────────────────

  pub fn get(&self, id: &EventId) -> Option<&Event> { self.events.iter().find(|e| &e.id == id) }

  /// Every event, in creation order.
  pub fn list(&self) -> &[Event] { &self.events }

  /// Events whose attendee list includes `user_id`.
  pub fn list_for_user(&self, user_id: &AccountId) -> Vec<&Event> {
    self.events.iter().filter(|e| e.is_attending(user_id)).collect()
  }

  pub fn search(&self, query: &EventQuery) -> Vec<&Event> {
    self.events.iter().filter(|e| query.matches(e)).collect()
  }

  /// Events scheduled on `date`.
  pub fn on_date(&self, date: NaiveDate) -> Vec<&Event> {
    self.events.iter().filter(|e| e.date == date).collect()
  }

  /// Distinct categories in first-seen order.
  pub fn categories(&self) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for event in &self.events {
      if !seen.contains(&event.category.as_str()) {
        seen.push(&event.category);
      }
    }
    seen
  }

  pub fn stats(&self, today: NaiveDate) -> CatalogStats {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for event in &self.events {
      *counts.entry(event.category.as_str()).or_default() += 1;
    }
    let mut top: Vec<(String, usize)> =
      counts.into_iter().map(|(c, n)| (c.to_owned(), n)).collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top.truncate(TOP_CATEGORIES);

    CatalogStats {
      total_events:    self.events.len(),
      upcoming_events: self.events.iter().filter(|e| e.date >= today).count(),
      top_categories:  top,
    }
  }

  // ── Internals ───────────────────────────────────────────────────────────

  fn index_of(&self, id: &EventId) -> Result<usize> {
    self
      .events
      .iter()
      .position(|e| &e.id == id)
      .ok_or_else(|| Error::EventNotFound(id.clone()))
  }

  fn commit(&mut self, events: Vec<Event>) -> Result<()> {
    self.storage.save(keys::EVENTS, &events)?;
    self.events = events;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::{event::fixtures::draft, storage::MemoryStore};

  fn catalog() -> EventCatalog<MemoryStore> {
    EventCatalog::open(Persistent::new(Arc::new(MemoryStore::new()))).unwrap()
  }

  fn member(id: &str) -> Account {
    Account {
      id:        id.into(),
      name:      id.into(),
      email:     format!("{id}@school.edu"),
      is_admin:  false,
      interests: Vec::new(),
    }
  }

  fn admin() -> Account { Account { is_admin: true, ..member("admin-1") } }

  #[test]
  fn add_requires_a_session() {
    let mut cat = catalog();
    assert!(matches!(cat.add(draft("Fair"), None), Err(Error::NotAuthenticated)));
    assert!(cat.list().is_empty());
  }

  #[test]
  fn add_assigns_creator_and_empty_attendees() {
    let mut cat = catalog();
    let john = member("user-1");
    let event = cat.add(draft("Science Fair"), Some(&john)).unwrap();
    assert_eq!(event.created_by, john.id);
    assert!(event.attendees.is_empty());
    assert_eq!(cat.get(&event.id), Some(&event));
  }

  #[test]
  fn non_creator_cannot_update_or_delete() {
    let mut cat = catalog();
    let event = cat.add(draft("Science Fair"), Some(&member("user-1"))).unwrap();
    let before = cat.list().to_vec();
    let other = member("user-2");

    let patch = EventPatch { title: Some("Hijacked".into()), ..Default::default() };
    assert!(matches!(cat.update(&event.id, patch, Some(&other)), Err(Error::NotAuthorized)));
    assert!(matches!(cat.delete(&event.id, Some(&other)), Err(Error::NotAuthorized)));
    assert_eq!(cat.list(), before.as_slice());
  }

  #[test]
  fn admin_bypasses_ownership() {
    let mut cat = catalog();
    let event = cat.add(draft("Science Fair"), Some(&member("user-1"))).unwrap();
    let patch = EventPatch { location: Some("Gym".into()), ..Default::default() };
    let updated = cat.update(&event.id, patch, Some(&admin())).unwrap();
    assert_eq!(updated.location, "Gym");
    assert_eq!(updated.created_by.as_str(), "user-1");

    let removed = cat.delete(&event.id, Some(&admin())).unwrap();
    assert_eq!(removed.title, "Science Fair");
    assert!(cat.get(&event.id).is_none());
  }

  #[test]
  fn missing_event_is_not_found() {
    let mut cat = catalog();
    let id = EventId::from("event-404");
    let john = member("user-1");
    assert!(cat.update(&id, EventPatch::default(), Some(&john)).unwrap_err().is_not_found());
    assert!(cat.delete(&id, Some(&john)).unwrap_err().is_not_found());
    assert!(cat.register_attendee(&id, Some(&john)).unwrap_err().is_not_found());
    assert!(cat.unregister_attendee(&id, Some(&john)).unwrap_err().is_not_found());
  }

  #[test]
  fn register_then_unregister_restores_attendees() {
    let mut cat = catalog();
    let event = cat.add(draft("Concert"), Some(&admin())).unwrap();
    let early = member("user-7");
    cat.register_attendee(&event.id, Some(&early)).unwrap();
    let before = cat.get(&event.id).unwrap().attendees.clone();

    let john = member("user-1");
    cat.register_attendee(&event.id, Some(&john)).unwrap();
    assert_eq!(cat.list_for_user(&john.id).len(), 1);
    cat.unregister_attendee(&event.id, Some(&john)).unwrap();

    assert_eq!(cat.get(&event.id).unwrap().attendees, before);
    assert!(cat.list_for_user(&john.id).is_empty());
  }

  #[test]
  fn double_registration_is_rejected() {
    let mut cat = catalog();
    let event = cat.add(draft("Concert"), Some(&admin())).unwrap();
    let john = member("user-1");
    cat.register_attendee(&event.id, Some(&john)).unwrap();
    assert!(matches!(
      cat.register_attendee(&event.id, Some(&john)),
      Err(Error::AlreadyRegistered(_))
    ));
    assert_eq!(cat.get(&event.id).unwrap().attendees.len(), 1);
  }

  #[test]
  fn unregister_without_registration_fails() {
    let mut cat = catalog();
    let event = cat.add(draft("Concert"), Some(&admin())).unwrap();
    assert!(matches!(
      cat.unregister_attendee(&event.id, Some(&member("user-1"))),
      Err(Error::NotRegistered(_))
    ));
    assert!(matches!(cat.register_attendee(&event.id, None), Err(Error::NotAuthenticated)));
  }

  #[test]
  fn stats_and_categories() {
    let mut cat = catalog();
    let admin = admin();
    let mut past = draft("Old Game");
    past.category = "Sports".into();
    past.date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    cat.add(past, Some(&admin)).unwrap();
    cat.add(draft("Fair"), Some(&admin)).unwrap();
    cat.add(draft("Quiz"), Some(&admin)).unwrap();

    assert_eq!(cat.categories(), vec!["Sports", "Academic"]);

    let stats = cat.stats(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    assert_eq!(stats.total_events, 3);
    assert_eq!(stats.upcoming_events, 2);
    assert_eq!(stats.top_categories, vec![("Academic".to_string(), 2), ("Sports".to_string(), 1)]);

    assert_eq!(cat.on_date(NaiveDate::from_ymd_opt(2030, 5, 14).unwrap()).len(), 2);
  }

  #[test]
  fn events_survive_reopen() {
    let backend = Arc::new(MemoryStore::new());
    let mut cat = EventCatalog::open(Persistent::new(backend.clone())).unwrap();
    let event = cat.add(draft("Fair"), Some(&admin())).unwrap();
    let reopened = EventCatalog::open(Persistent::new(backend)).unwrap();
    assert_eq!(reopened.get(&event.id), Some(&event));
  }
}
