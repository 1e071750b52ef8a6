//! The `Mailer` trait, the external email collaborator.
//!
//! Transports live outside this crate (see `campus-server`). The broadcast
//! hands over one [`MailBatch`] per event lifecycle change.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::id::EventId;

/// One outgoing message to many recipients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailBatch {
  pub recipients: Vec<String>,
  /// The broadcast text, e.g. "New event created: Science Fair".
  pub message:    String,
  pub event_id:   EventId,
}

/// Sends a batch of email in a single call.
///
/// Failures are reported to the caller, which logs them; they never undo the
/// change that triggered the mail.
pub trait Mailer: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send_batch(
    &self,
    batch: &MailBatch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
