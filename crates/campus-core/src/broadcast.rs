//! The broadcast fan-out run after every event create, update and delete.
//!
//! [`fan_out`] writes one notification per member with an email address and
//! returns a [`Dispatch`] holding the single batched email. The caller sends
//! it once it no longer holds the application state, so a slow mail
//! provider never blocks other requests. Notification writes and email
//! delivery are independent and best-effort: failures are logged, never
//! returned.

use std::sync::Arc;

use crate::{
  directory::UserDirectory,
  feed::NotificationFeed,
  id::{EventId, NotificationId},
  mailer::{MailBatch, Mailer},
  notification::{NewNotification, NotificationKind},
  storage::KeyValueStore,
};

/// What the notification half of a broadcast managed to write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
  /// Notifications written, one per recipient.
  pub notifications: Vec<NotificationId>,
  /// Addresses the email goes to.
  pub recipients:    Vec<String>,
  /// Notification writes that failed.
  pub failed_writes: usize,
}

/// Write the broadcast notifications and prepare the batched email.
pub fn fan_out<K, M>(
  directory: &UserDirectory<K>,
  feed: &mut NotificationFeed<K>,
  mailer: &Arc<M>,
  message: &str,
  event_id: &EventId,
) -> Dispatch<M>
where
  K: KeyValueStore,
{
  let mut report = BroadcastReport::default();

  for account in directory.accounts().filter(|a| !a.is_admin && !a.email.is_empty()) {
    let input = NewNotification::new(account.id.clone(), message, NotificationKind::Event)
      .about(event_id.clone());
    match feed.add(input) {
      Ok(n) => report.notifications.push(n.id),
      Err(e) => {
        report.failed_writes += 1;
        tracing::error!(user = %account.id, error = %e, "failed to write broadcast notification");
      }
    }
    report.recipients.push(account.email);
  }

  let batch = MailBatch {
    recipients: report.recipients.clone(),
    message:    message.to_owned(),
    event_id:   event_id.clone(),
  };
  Dispatch { report, batch, mailer: Arc::clone(mailer) }
}

/// A broadcast whose notifications are stored and whose email is not yet
/// sent. Owns everything it needs, so it can be moved onto a spawned task.
#[must_use = "the broadcast email is only sent by `Dispatch::send`"]
pub struct Dispatch<M> {
  report: BroadcastReport,
  batch:  MailBatch,
  mailer: Arc<M>,
}

impl<M> Dispatch<M> {
  pub fn report(&self) -> &BroadcastReport { &self.report }

  pub fn batch(&self) -> &MailBatch { &self.batch }
}

impl<M: Mailer> Dispatch<M> {
  /// Hand the batch to the mailer. Returns whether it was accepted; a
  /// failure is logged and leaves the triggering change in place.
  pub async fn send(self) -> bool {
    match self.mailer.send_batch(&self.batch).await {
      Ok(()) => {
        tracing::info!(
          event = %self.batch.event_id,
          recipients = self.batch.recipients.len(),
          "broadcast mailed"
        );
        true
      }
      Err(e) => {
        tracing::error!(event = %self.batch.event_id, error = %e, "failed to send broadcast email");
        false
      }
    }
  }
}
