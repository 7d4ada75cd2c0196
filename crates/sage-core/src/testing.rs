//! In-memory store with failure injection, for unit tests.

use std::sync::{
  Mutex,
  atomic::{AtomicBool, Ordering},
};

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
  admin::{AdminCredential, SessionRecord},
  guestbook::{GuestbookEntry, NewGuestbookEntry},
  interaction::{InteractionRecord, LogStatus},
  knowledge::{KnowledgeEntry, NewKnowledge},
  store::{AdminStore, FinalizeOutcome, GuestbookStore, KnowledgeStore, LogStore},
};

#[derive(Debug, Error)]
#[error("injected failure: {0}")]
pub struct MemoryError(&'static str);

/// Collections are kept in insertion order; "newest first" reads reverse them.
#[derive(Default)]
pub struct MemoryStore {
  knowledge:            Mutex<Vec<KnowledgeEntry>>,
  logs:                 Mutex<Vec<InteractionRecord>>,
  guestbook:            Mutex<Vec<GuestbookEntry>>,
  admins:               Mutex<Vec<AdminCredential>>,
  sessions:             Mutex<Vec<SessionRecord>>,
  fail_knowledge_reads: AtomicBool,
  fail_log_writes:      AtomicBool,
}

impl MemoryStore {
  pub fn fail_knowledge_reads(&self, fail: bool) {
    self.fail_knowledge_reads.store(fail, Ordering::SeqCst);
  }

  pub fn fail_log_writes(&self, fail: bool) {
    self.fail_log_writes.store(fail, Ordering::SeqCst);
  }

  pub fn session_count(&self) -> usize { self.sessions.lock().unwrap().len() }

  fn check_knowledge_read(&self) -> Result<(), MemoryError> {
    if self.fail_knowledge_reads.load(Ordering::SeqCst) {
      return Err(MemoryError("knowledge read"));
    }
    Ok(())
  }

  fn check_log_write(&self) -> Result<(), MemoryError> {
    if self.fail_log_writes.load(Ordering::SeqCst) {
      return Err(MemoryError("log write"));
    }
    Ok(())
  }
}

impl KnowledgeStore for MemoryStore {
  type Error = MemoryError;

  async fn create_knowledge(&self, input: NewKnowledge) -> Result<KnowledgeEntry, MemoryError> {
    let entry = KnowledgeEntry {
      id:         Uuid::new_v4(),
      question:   input.question().to_owned(),
      answer:     input.answer().to_owned(),
      tags:       input.tags().to_vec(),
      active:     input.active(),
      created_at: Utc::now(),
    };
    self.knowledge.lock().unwrap().push(entry.clone());
    Ok(entry)
  }

  async fn get_knowledge(&self, id: Uuid) -> Result<Option<KnowledgeEntry>, MemoryError> {
    self.check_knowledge_read()?;
    Ok(self.knowledge.lock().unwrap().iter().find(|e| e.id == id).cloned())
  }

  async fn list_active_knowledge(&self) -> Result<Vec<KnowledgeEntry>, MemoryError> {
    self.check_knowledge_read()?;
    Ok(
      self
        .knowledge
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.active)
        .cloned()
        .collect(),
    )
  }

  async fn list_knowledge(&self) -> Result<Vec<KnowledgeEntry>, MemoryError> {
    self.check_knowledge_read()?;
    Ok(self.knowledge.lock().unwrap().iter().rev().cloned().collect())
  }

  async fn set_knowledge_active(
    &self,
    id: Uuid,
    active: bool,
  ) -> Result<Option<KnowledgeEntry>, MemoryError> {
    let mut knowledge = self.knowledge.lock().unwrap();
    Ok(knowledge.iter_mut().find(|e| e.id == id).map(|e| {
      e.active = active;
      e.clone()
    }))
  }
}

impl LogStore for MemoryStore {
  type Error = MemoryError;

  async fn insert_log(
    &self,
    question: String,
    answer: String,
    status: LogStatus,
  ) -> Result<InteractionRecord, MemoryError> {
    self.check_log_write()?;
    let record = InteractionRecord {
      id: Uuid::new_v4(),
      question,
      answer,
      status,
      created_at: Utc::now(),
    };
    self.logs.lock().unwrap().push(record.clone());
    Ok(record)
  }

  async fn finalize_log(&self, id: Uuid, answer: String) -> Result<FinalizeOutcome, MemoryError> {
    self.check_log_write()?;
    let mut logs = self.logs.lock().unwrap();
    Ok(match logs.iter_mut().find(|r| r.id == id) {
      None => FinalizeOutcome::NotFound,
      Some(r) if r.status == LogStatus::Final => FinalizeOutcome::AlreadyFinal,
      Some(r) => {
        r.answer = answer;
        r.status = LogStatus::Final;
        FinalizeOutcome::Finalized(r.clone())
      }
    })
  }

  async fn recent_logs(&self, limit: usize) -> Result<Vec<InteractionRecord>, MemoryError> {
    Ok(self.logs.lock().unwrap().iter().rev().take(limit).cloned().collect())
  }
}

impl GuestbookStore for MemoryStore {
  type Error = MemoryError;

  async fn add_guestbook_entry(
    &self,
    input: NewGuestbookEntry,
  ) -> Result<GuestbookEntry, MemoryError> {
    let entry = GuestbookEntry {
      id:         Uuid::new_v4(),
      message:    input.message().to_owned(),
      created_at: Utc::now(),
    };
    self.guestbook.lock().unwrap().push(entry.clone());
    Ok(entry)
  }

  async fn list_guestbook(&self) -> Result<Vec<GuestbookEntry>, MemoryError> {
    Ok(self.guestbook.lock().unwrap().iter().rev().cloned().collect())
  }

  async fn delete_guestbook_entry(&self, id: Uuid) -> Result<bool, MemoryError> {
    let mut guestbook = self.guestbook.lock().unwrap();
    let before = guestbook.len();
    guestbook.retain(|e| e.id != id);
    Ok(guestbook.len() != before)
  }
}

impl AdminStore for MemoryStore {
  type Error = MemoryError;

  async fn add_admin(
    &self,
    username: String,
    password_hash: String,
  ) -> Result<AdminCredential, MemoryError> {
    let credential = AdminCredential { username, password_hash, created_at: Utc::now() };
    self.admins.lock().unwrap().push(credential.clone());
    Ok(credential)
  }

  async fn find_admin(&self, username: String) -> Result<Option<AdminCredential>, MemoryError> {
    Ok(
      self
        .admins
        .lock()
        .unwrap()
        .iter()
        .find(|a| a.username == username)
        .cloned(),
    )
  }

  async fn insert_session(&self, session: SessionRecord) -> Result<(), MemoryError> {
    self.sessions.lock().unwrap().push(session);
    Ok(())
  }

  async fn find_session(&self, token_hash: String) -> Result<Option<SessionRecord>, MemoryError> {
    Ok(
      self
        .sessions
        .lock()
        .unwrap()
        .iter()
        .find(|s| s.token_hash == token_hash)
        .cloned(),
    )
  }

  async fn delete_session(&self, token_hash: String) -> Result<bool, MemoryError> {
    let mut sessions = self.sessions.lock().unwrap();
    let before = sessions.len();
    sessions.retain(|s| s.token_hash != token_hash);
    Ok(sessions.len() != before)
  }

  async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, MemoryError> {
    let mut sessions = self.sessions.lock().unwrap();
    let before = sessions.len();
    sessions.retain(|s| s.expires_at > now);
    Ok(before - sessions.len())
  }
}
