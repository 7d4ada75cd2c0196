//! Administrative façade over the knowledge base, the interaction logs and
//! the guestbook.
//!
//! Every operation takes the caller's [`AdminSession`]; there is no ambient
//! "logged in" state. The session is re-checked against the store on each
//! call, so a logged-out session is refused even if the value is kept.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  admin::AdminSession,
  guestbook::{GuestbookEntry, GuestbookLedger},
  interaction::InteractionRecord,
  knowledge::{KnowledgeEntry, NewKnowledge},
  store::{AdminStore, GuestbookStore, KnowledgeStore, LogStore},
};

/// Number of log rows returned when the caller gives no limit.
pub const DEFAULT_LOG_LIMIT: usize = 50;

pub struct AdminCurationService<S> {
  store:     Arc<S>,
  guestbook: GuestbookLedger<S>,
}

impl<S> Clone for AdminCurationService<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), guestbook: self.guestbook.clone() }
  }
}

impl<S> AdminCurationService<S>
where
  S: KnowledgeStore + LogStore + GuestbookStore + AdminStore,
{
  pub fn new(store: Arc<S>) -> Self {
    let guestbook = GuestbookLedger::new(Arc::clone(&store));
    Self { store, guestbook }
  }

  async fn check(&self, session: &AdminSession) -> Result<()> {
    if session.is_expired_at(Utc::now()) {
      return Err(Error::Unauthorized);
    }
    let stored = self
      .store
      .find_session(session.token_hash().to_owned())
      .await
      .map_err(Error::store)?;
    match stored {
      Some(record) if record.username == session.username() => Ok(()),
      _ => Err(Error::Unauthorized),
    }
  }

  // ── Knowledge ───────────────────────────────────────────────────────────

  pub async fn add_knowledge(
    &self,
    session: &AdminSession,
    input: NewKnowledge,
  ) -> Result<KnowledgeEntry> {
    self.check(session).await?;
    let entry = self
      .store
      .create_knowledge(input)
      .await
      .map_err(Error::store)?;
    tracing::info!(admin = session.username(), id = %entry.id, "knowledge entry added");
    Ok(entry)
  }

  /// Flip the `active` flag and return the updated entry.
  ///
  /// Read-then-write: concurrent toggles of one entry are last-write-wins.
  pub async fn toggle_knowledge(
    &self,
    session: &AdminSession,
    id: Uuid,
  ) -> Result<KnowledgeEntry> {
    self.check(session).await?;
    let current = self
      .store
      .get_knowledge(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::KnowledgeNotFound(id))?;

    let entry = self
      .store
      .set_knowledge_active(id, !current.active)
      .await
      .map_err(Error::store)?
      .ok_or(Error::KnowledgeNotFound(id))?;
    tracing::info!(
      admin = session.username(),
      %id,
      active = entry.active,
      "knowledge entry toggled"
    );
    Ok(entry)
  }

  /// Every entry, newest first.
  pub async fn list_knowledge(&self, session: &AdminSession) -> Result<Vec<KnowledgeEntry>> {
    self.check(session).await?;
    self.store.list_knowledge().await.map_err(Error::store)
  }

  // ── Logs ────────────────────────────────────────────────────────────────

  /// The most recent log rows, newest first. `None` means
  /// [`DEFAULT_LOG_LIMIT`].
  pub async fn list_logs(
    &self,
    session: &AdminSession,
    limit: Option<usize>,
  ) -> Result<Vec<InteractionRecord>> {
    self.check(session).await?;
    self
      .store
      .recent_logs(limit.unwrap_or(DEFAULT_LOG_LIMIT))
      .await
      .map_err(Error::store)
  }

  // ── Guestbook ───────────────────────────────────────────────────────────

  pub async fn list_guestbook(&self, session: &AdminSession) -> Result<Vec<GuestbookEntry>> {
    self.check(session).await?;
    self.guestbook.list().await
  }

  pub async fn delete_guestbook_entry(&self, session: &AdminSession, id: Uuid) -> Result<()> {
    self.check(session).await?;
    self.guestbook.remove(id).await
  }
}

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;
  use crate::{auth::Authenticator, testing::MemoryStore};

  struct Fixture {
    store:   Arc<MemoryStore>,
    service: AdminCurationService<MemoryStore>,
    session: AdminSession,
  }

  async fn fixture(ttl: Duration) -> Fixture {
    let store = Arc::new(MemoryStore::default());
    let auth = Authenticator::new(Arc::clone(&store), ttl);
    auth.register("admin", "pw").await.unwrap();
    let session = auth.login("admin", "pw").await.unwrap().session;
    let service = AdminCurationService::new(Arc::clone(&store));
    Fixture { store, service, session }
  }

  fn knowledge(question: &str, active: bool) -> NewKnowledge {
    NewKnowledge::new(question, "some answer", vec!["faq".into()], active).unwrap()
  }

  #[tokio::test]
  async fn added_entry_is_listed_with_its_active_flag() {
    let f = fixture(Duration::hours(1)).await;
    let on = f.service.add_knowledge(&f.session, knowledge("first", true)).await.unwrap();
    let off = f.service.add_knowledge(&f.session, knowledge("second", false)).await.unwrap();

    let all = f.service.list_knowledge(&f.session).await.unwrap();
    assert_eq!(all.len(), 2);
    // Newest first.
    assert_eq!(all[0].id, off.id);
    assert!(!all[0].active);
    assert_eq!(all[1].id, on.id);
    assert!(all[1].active);
    assert_eq!(all[1].tags, vec!["faq"]);
  }

  #[tokio::test]
  async fn toggling_twice_restores_original_flag() {
    let f = fixture(Duration::hours(1)).await;
    let entry = f.service.add_knowledge(&f.session, knowledge("q", true)).await.unwrap();

    let once = f.service.toggle_knowledge(&f.session, entry.id).await.unwrap();
    assert!(!once.active);
    let twice = f.service.toggle_knowledge(&f.session, entry.id).await.unwrap();
    assert!(twice.active);
    assert_eq!(twice.created_at, entry.created_at);
  }

  #[tokio::test]
  async fn toggling_unknown_entry_is_not_found() {
    let f = fixture(Duration::hours(1)).await;
    let id = Uuid::new_v4();
    let err = f.service.toggle_knowledge(&f.session, id).await.unwrap_err();
    assert!(matches!(err, Error::KnowledgeNotFound(missing) if missing == id));
  }

  #[tokio::test]
  async fn logs_are_limited_and_newest_first() {
    let f = fixture(Duration::hours(1)).await;
    for i in 0..60 {
      f.store
        .insert_log(format!("q{i}"), "a".into(), crate::interaction::LogStatus::Final)
        .await
        .unwrap();
    }

    let default = f.service.list_logs(&f.session, None).await.unwrap();
    assert_eq!(default.len(), DEFAULT_LOG_LIMIT);
    assert_eq!(default[0].question, "q59");

    let five = f.service.list_logs(&f.session, Some(5)).await.unwrap();
    assert_eq!(five.len(), 5);
  }

  #[tokio::test]
  async fn guestbook_moderation() {
    let f = fixture(Duration::hours(1)).await;
    let ledger = GuestbookLedger::new(Arc::clone(&f.store));
    let entry = ledger.add("unwanted").await.unwrap();

    assert_eq!(f.service.list_guestbook(&f.session).await.unwrap().len(), 1);
    f.service.delete_guestbook_entry(&f.session, entry.id).await.unwrap();
    assert!(f.service.list_guestbook(&f.session).await.unwrap().is_empty());

    let err = f
      .service
      .delete_guestbook_entry(&f.session, entry.id)
      .await
      .unwrap_err();
    assert!(err.is_not_found());
  }

  #[tokio::test]
  async fn logged_out_session_is_refused() {
    let store = Arc::new(MemoryStore::default());
    let auth = Authenticator::new(Arc::clone(&store), Duration::hours(1));
    auth.register("admin", "pw").await.unwrap();
    let session = auth.login("admin", "pw").await.unwrap().session;
    let service = AdminCurationService::new(Arc::clone(&store));
    assert!(service.list_knowledge(&session).await.is_ok());

    auth.logout(&session).await.unwrap();
    assert!(matches!(service.list_knowledge(&session).await, Err(Error::Unauthorized)));
    assert!(matches!(
      service.add_knowledge(&session, knowledge("q", true)).await,
      Err(Error::Unauthorized)
    ));
    assert!(store.list_knowledge().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn expired_session_is_refused() {
    let f = fixture(Duration::seconds(-1)).await;
    assert!(matches!(
      f.service.list_knowledge(&f.session).await,
      Err(Error::Unauthorized)
    ));
    assert!(matches!(
      f.service.add_knowledge(&f.session, knowledge("q", true)).await,
      Err(Error::Unauthorized)
    ));
    assert!(f.store.list_knowledge().await.unwrap().is_empty());
  }
}
