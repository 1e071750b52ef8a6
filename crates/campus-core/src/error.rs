//! Error types for `campus-core`.

use thiserror::Error;

use crate::id::{AccountId, EventId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("you must be logged in to do that")]
  NotAuthenticated,

  #[error("you do not have permission to do that")]
  NotAuthorized,

  #[error("event not found: {0}")]
  EventNotFound(EventId),

  #[error("account not found: {0}")]
  AccountNotFound(AccountId),

  #[error("invalid email or password")]
  InvalidCredentials,

  #[error("email already registered: {0}")]
  EmailAlreadyRegistered(String),

  #[error("already registered for event {0}")]
  AlreadyRegistered(EventId),

  #[error("not registered for event {0}")]
  NotRegistered(EventId),

  #[error("notification has no recipient")]
  MissingRecipient,

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Whether this is one of the "referenced id is absent" variants.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::EventNotFound(_) | Self::AccountNotFound(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
