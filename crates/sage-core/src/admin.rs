//! Administrator credentials and sessions.
//!
//! Passwords are only ever held as argon2 PHC strings, and session tokens
//! only as SHA-256 digests. The plaintext token exists once, in the
//! [`LoginGrant`] handed back to the client.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row of the `admins` collection.
#[derive(Clone, Serialize, Deserialize)]
pub struct AdminCredential {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

impl fmt::Debug for AdminCredential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AdminCredential")
      .field("username", &self.username)
      .field("password_hash", &"<redacted>")
      .field("created_at", &self.created_at)
      .finish()
  }
}

/// A row of the `admin_sessions` collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
  /// Hex SHA-256 of the bearer token.
  pub token_hash: String,
  pub username:   String,
  pub issued_at:  DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

/// Proof of a successful login, required by every curation operation.
///
/// Only [`crate::auth::Authenticator`] can construct one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
  username:   String,
  token_hash: String,
  expires_at: DateTime<Utc>,
}

impl AdminSession {
  pub(crate) fn from_record(record: SessionRecord) -> Self {
    Self {
      username:   record.username,
      token_hash: record.token_hash,
      expires_at: record.expires_at,
    }
  }

  pub fn username(&self) -> &str { &self.username }

  pub fn expires_at(&self) -> DateTime<Utc> { self.expires_at }

  pub(crate) fn token_hash(&self) -> &str { &self.token_hash }

  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool { now >= self.expires_at }
}

/// Returned by a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginGrant {
  pub username:   String,
  /// Bearer token; not recoverable from the store.
  pub token:      String,
  pub expires_at: DateTime<Utc>,
  #[serde(skip)]
  pub session:    AdminSession,
}
