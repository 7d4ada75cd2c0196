//! The public guestbook: an append-only message board that only an
//! administrator can prune.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, store::GuestbookStore};

/// Longest accepted message, in characters, after trimming.
pub const MAX_MESSAGE_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestbookEntry {
  pub id:         Uuid,
  pub message:    String,
  pub created_at: DateTime<Utc>,
}

/// Validated input to [`GuestbookStore::add_guestbook_entry`].
#[derive(Debug, Clone)]
pub struct NewGuestbookEntry {
  message: String,
}

impl NewGuestbookEntry {
  pub fn new(message: &str) -> Result<Self> {
    let message = message.trim();
    if message.is_empty() {
      return Err(Error::validation("message must not be empty"));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
      return Err(Error::validation(format!(
        "message must be at most {MAX_MESSAGE_CHARS} characters"
      )));
    }
    Ok(Self { message: message.to_owned() })
  }

  pub fn message(&self) -> &str { &self.message }
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

pub struct GuestbookLedger<G> {
  store: Arc<G>,
}

impl<G> Clone for GuestbookLedger<G> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<G: GuestbookStore> GuestbookLedger<G> {
  pub fn new(store: Arc<G>) -> Self { Self { store } }

  /// All entries, newest first.
  pub async fn list(&self) -> Result<Vec<GuestbookEntry>> {
    self.store.list_guestbook().await.map_err(Error::store)
  }

  pub async fn add(&self, message: &str) -> Result<GuestbookEntry> {
    let input = NewGuestbookEntry::new(message)?;
    self.store.add_guestbook_entry(input).await.map_err(Error::store)
  }

  pub async fn remove(&self, id: Uuid) -> Result<()> {
    let deleted = self
      .store
      .delete_guestbook_entry(id)
      .await
      .map_err(Error::store)?;
    if !deleted {
      return Err(Error::GuestbookEntryNotFound(id));
    }
    tracing::info!(%id, "guestbook entry removed");
    Ok(())
  }
}
