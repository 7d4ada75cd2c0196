//! Interaction logs, the audit trail of every chat turn.
//!
//! Each turn first writes a provisional row carrying a placeholder answer,
//! then records the resolved answer. How the second write lands depends on
//! the configured [`LogPolicy`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  store::{FinalizeOutcome, LogStore},
};

/// Answer text held by a provisional row until the turn resolves.
pub const DEFAULT_PLACEHOLDER: &str = "Processing...";

// ─── Records ─────────────────────────────────────────────────────────────────

/// Whether a row still holds the placeholder answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
  Pending,
  Final,
}

/// One stored row of the `chatbot_logs` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
  pub id:         Uuid,
  /// The visitor's input, verbatim.
  pub question:   String,
  pub answer:     String,
  pub status:     LogStatus,
  pub created_at: DateTime<Utc>,
}

/// How the final answer of a turn is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogPolicy {
  /// Insert a second row with the final answer, leaving the pending row in
  /// place. Each completed turn yields two rows.
  Append,
  /// Update the pending row once. Each completed turn yields one row.
  #[default]
  UpdateInPlace,
}

/// Identifies the provisional row written for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogHandle(Uuid);

impl LogHandle {
  pub fn id(&self) -> Uuid { self.0 }
}

// ─── Logger ──────────────────────────────────────────────────────────────────

/// Sole writer of interaction logs.
pub struct InteractionLogger<L> {
  store:       Arc<L>,
  policy:      LogPolicy,
  placeholder: String,
}

impl<L> Clone for InteractionLogger<L> {
  fn clone(&self) -> Self {
    Self {
      store:       Arc::clone(&self.store),
      policy:      self.policy,
      placeholder: self.placeholder.clone(),
    }
  }
}

impl<L: LogStore> InteractionLogger<L> {
  pub fn new(store: Arc<L>, policy: LogPolicy, placeholder: impl Into<String>) -> Self {
    Self { store, policy, placeholder: placeholder.into() }
  }

  pub fn policy(&self) -> LogPolicy { self.policy }

  /// Insert the pending row for `question`.
  pub async fn record_provisional(&self, question: &str) -> Result<LogHandle> {
    let record = self
      .store
      .insert_log(question.to_owned(), self.placeholder.clone(), LogStatus::Pending)
      .await
      .map_err(Error::store)?;
    Ok(LogHandle(record.id))
  }

  /// Persist the resolved answer for a turn.
  ///
  /// `handle` is `None` when the provisional write failed; the answer is then
  /// inserted as a fresh final row under either policy.
  pub async fn record_final(
    &self,
    handle: Option<LogHandle>,
    question: &str,
    answer: &str,
  ) -> Result<InteractionRecord> {
    match (self.policy, handle) {
      (LogPolicy::UpdateInPlace, Some(handle)) => {
        let outcome = self
          .store
          .finalize_log(handle.id(), answer.to_owned())
          .await
          .map_err(Error::store)?;
        match outcome {
          FinalizeOutcome::Finalized(record) => Ok(record),
          FinalizeOutcome::AlreadyFinal => Err(Error::LogAlreadyFinal(handle.id())),
          FinalizeOutcome::NotFound => Err(Error::LogNotFound(handle.id())),
        }
      }
      _ => self
        .store
        .insert_log(question.to_owned(), answer.to_owned(), LogStatus::Final)
        .await
        .map_err(Error::store),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::MemoryStore;

  fn logger(policy: LogPolicy) -> (Arc<MemoryStore>, InteractionLogger<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let logger = InteractionLogger::new(Arc::clone(&store), policy, DEFAULT_PLACEHOLDER);
    (store, logger)
  }

  #[tokio::test]
  async fn provisional_row_holds_placeholder() {
    let (store, logger) = logger(LogPolicy::UpdateInPlace);
    let handle = logger.record_provisional("hello there").await.unwrap();

    let logs = store.recent_logs(10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].id, handle.id());
    assert_eq!(logs[0].answer, DEFAULT_PLACEHOLDER);
    assert_eq!(logs[0].status, LogStatus::Pending);
  }

  #[tokio::test]
  async fn append_policy_writes_second_row() {
    let (store, logger) = logger(LogPolicy::Append);
    let handle = logger.record_provisional("hello there").await.unwrap();
    logger
      .record_final(Some(handle), "hello there", "hi!")
      .await
      .unwrap();

    let logs = store.recent_logs(10).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].answer, "hi!");
    assert_eq!(logs[0].status, LogStatus::Final);
    assert_eq!(logs[1].answer, DEFAULT_PLACEHOLDER);
    assert_eq!(logs[1].status, LogStatus::Pending);
  }

  #[tokio::test]
  async fn update_in_place_finalizes_once() {
    let (store, logger) = logger(LogPolicy::UpdateInPlace);
    let handle = logger.record_provisional("hello there").await.unwrap();
    let record = logger
      .record_final(Some(handle), "hello there", "hi!")
      .await
      .unwrap();
    assert_eq!(record.id, handle.id());

    let logs = store.recent_logs(10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].answer, "hi!");
    assert_eq!(logs[0].status, LogStatus::Final);

    let err = logger
      .record_final(Some(handle), "hello there", "again")
      .await
      .unwrap_err();
    assert!(matches!(err, Error::LogAlreadyFinal(id) if id == handle.id()));
  }

  #[tokio::test]
  async fn missing_handle_inserts_final_row() {
    let (store, logger) = logger(LogPolicy::UpdateInPlace);
    logger.record_final(None, "orphan", "answer").await.unwrap();

    let logs = store.recent_logs(10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, LogStatus::Final);
  }
}
