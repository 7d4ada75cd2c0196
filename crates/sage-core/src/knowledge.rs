//! Knowledge entries: the curated question/answer pairs the assistant
//! answers from.
//!
//! Entries are never deleted. Clearing the `active` flag is the soft-delete;
//! only active entries take part in matching.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Entry ───────────────────────────────────────────────────────────────────

/// A curated question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
  pub id:         Uuid,
  pub question:   String,
  pub answer:     String,
  pub tags:       Vec<String>,
  pub active:     bool,
  /// Store-assigned; never changes after creation.
  pub created_at: DateTime<Utc>,
}

// ─── NewKnowledge ────────────────────────────────────────────────────────────

/// Validated input to [`crate::store::KnowledgeStore::create_knowledge`].
///
/// Only constructible through [`NewKnowledge::new`], so a value of this type
/// always carries a non-empty, trimmed question and answer.
#[derive(Debug, Clone)]
pub struct NewKnowledge {
  question: String,
  answer:   String,
  tags:     Vec<String>,
  active:   bool,
}

impl NewKnowledge {
  pub fn new(
    question: &str,
    answer: &str,
    tags: Vec<String>,
    active: bool,
  ) -> Result<Self> {
    let question = question.trim();
    let answer = answer.trim();
    if question.is_empty() || answer.is_empty() {
      return Err(Error::validation("question and answer are required"));
    }

    Ok(Self {
      question: question.to_owned(),
      answer: answer.to_owned(),
      tags: tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect(),
      active,
    })
  }

  pub fn question(&self) -> &str { &self.question }

  pub fn answer(&self) -> &str { &self.answer }

  pub fn tags(&self) -> &[String] { &self.tags }

  pub fn active(&self) -> bool { self.active }
}

// ─── Tags ────────────────────────────────────────────────────────────────────

/// Split a comma-separated tag string, trimming each label and dropping
/// empty ones.
pub fn parse_tags(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_owned)
    .collect()
}

/// Join tags into the single delimited string kept by the store.
pub fn join_tags(tags: &[String]) -> String { tags.join(",") }
