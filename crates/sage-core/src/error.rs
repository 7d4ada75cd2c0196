//! Error types for `sage-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// Rejected locally; no storage call was made.
  #[error("{0}")]
  Validation(String),

  #[error("knowledge entry not found: {0}")]
  KnowledgeNotFound(Uuid),

  #[error("guestbook entry not found: {0}")]
  GuestbookEntryNotFound(Uuid),

  #[error("log record not found: {0}")]
  LogNotFound(Uuid),

  #[error("log record {0} already holds its final answer")]
  LogAlreadyFinal(Uuid),

  /// Deliberately identical for unknown usernames and wrong passwords.
  #[error("invalid username or password")]
  LoginFailed,

  #[error("unauthorized")]
  Unauthorized,

  #[error("illegal turn transition from {from:?} to {to:?}")]
  InvalidTransition {
    from: crate::conversation::TurnState,
    to:   crate::conversation::TurnState,
  },

  #[error("password hashing failed: {0}")]
  PasswordHash(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }

  /// Wrap a backend error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::KnowledgeNotFound(_)
        | Self::GuestbookEntryNotFound(_)
        | Self::LogNotFound(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
