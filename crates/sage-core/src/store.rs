//! Storage traits: the contract every backend fulfils.
//!
//! The traits are implemented by storage backends (e.g. `sage-store-sqlite`).
//! Services in this crate and the HTTP layer depend on these abstractions,
//! never on a concrete backend. Identifiers and timestamps are always assigned
//! by the store.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  admin::{AdminCredential, SessionRecord},
  guestbook::{GuestbookEntry, NewGuestbookEntry},
  interaction::{InteractionRecord, LogStatus},
  knowledge::{KnowledgeEntry, NewKnowledge},
};

// ─── Knowledge ───────────────────────────────────────────────────────────────

/// The `chatbot_knowledge` collection.
///
/// There is intentionally no delete; deactivation is the soft-delete.
pub trait KnowledgeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new entry. `id` and `created_at` are set by the store.
  fn create_knowledge(
    &self,
    input: NewKnowledge,
  ) -> impl Future<Output = Result<KnowledgeEntry, Self::Error>> + Send + '_;

  /// Retrieve an entry by id. Returns `None` if not found.
  fn get_knowledge(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<KnowledgeEntry>, Self::Error>> + Send + '_;

  /// All entries with `active = true`, in insertion order.
  fn list_active_knowledge(
    &self,
  ) -> impl Future<Output = Result<Vec<KnowledgeEntry>, Self::Error>> + Send + '_;

  /// Every entry, newest first.
  fn list_knowledge(
    &self,
  ) -> impl Future<Output = Result<Vec<KnowledgeEntry>, Self::Error>> + Send + '_;

  /// Overwrite the `active` flag. Returns the updated entry, or `None` if
  /// `id` does not exist.
  fn set_knowledge_active(
    &self,
    id: Uuid,
    active: bool,
  ) -> impl Future<Output = Result<Option<KnowledgeEntry>, Self::Error>> + Send + '_;
}

// ─── Interaction logs ────────────────────────────────────────────────────────

/// Result of [`LogStore::finalize_log`].
#[derive(Debug, Clone)]
pub enum FinalizeOutcome {
  Finalized(InteractionRecord),
  /// The record exists but its answer was already finalized.
  AlreadyFinal,
  NotFound,
}

/// The `chatbot_logs` collection.
pub trait LogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert a new log row.
  fn insert_log(
    &self,
    question: String,
    answer: String,
    status: LogStatus,
  ) -> impl Future<Output = Result<InteractionRecord, Self::Error>> + Send + '_;

  /// Replace the answer of a pending row and mark it final. A row is
  /// finalized at most once.
  fn finalize_log(
    &self,
    id: Uuid,
    answer: String,
  ) -> impl Future<Output = Result<FinalizeOutcome, Self::Error>> + Send + '_;

  /// The `limit` most recent rows, newest first.
  fn recent_logs(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<InteractionRecord>, Self::Error>> + Send + '_;
}

// ─── Guestbook ───────────────────────────────────────────────────────────────

/// The `guestbook` collection.
pub trait GuestbookStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn add_guestbook_entry(
    &self,
    input: NewGuestbookEntry,
  ) -> impl Future<Output = Result<GuestbookEntry, Self::Error>> + Send + '_;

  /// Every entry, newest first.
  fn list_guestbook(
    &self,
  ) -> impl Future<Output = Result<Vec<GuestbookEntry>, Self::Error>> + Send + '_;

  /// Delete by id. Returns `false` if nothing was deleted.
  fn delete_guestbook_entry(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Admins ──────────────────────────────────────────────────────────────────

/// The `admins` and `admin_sessions` collections.
pub trait AdminStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Store a credential. The caller has already hashed the password.
  fn add_admin(
    &self,
    username: String,
    password_hash: String,
  ) -> impl Future<Output = Result<AdminCredential, Self::Error>> + Send + '_;

  fn find_admin(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<AdminCredential>, Self::Error>> + Send + '_;

  fn insert_session(
    &self,
    session: SessionRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn find_session(
    &self,
    token_hash: String,
  ) -> impl Future<Output = Result<Option<SessionRecord>, Self::Error>> + Send + '_;

  /// Returns `false` if no session had this hash.
  fn delete_session(
    &self,
    token_hash: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Remove every session with `expires_at <= now`; returns how many went.
  fn delete_expired_sessions(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}

// ─── Aggregate ───────────────────────────────────────────────────────────────

/// A backend providing every collection. Blanket-implemented.
pub trait Store: KnowledgeStore + LogStore + GuestbookStore + AdminStore {}

impl<T> Store for T where T: KnowledgeStore + LogStore + GuestbookStore + AdminStore {}
