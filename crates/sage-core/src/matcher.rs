//! Keyword-prefix matching of a visitor's query against the active
//! knowledge set.
//!
//! The heuristic is intentionally simple: lowercase both sides and compare
//! five-character prefixes by containment, in either direction. The first
//! candidate that satisfies either test wins; there is no scoring.

use serde::{Deserialize, Serialize};

use crate::knowledge::KnowledgeEntry;

/// Number of leading characters compared by [`find_match`].
pub const PREFIX_CHARS: usize = 5;

// ─── Replies ─────────────────────────────────────────────────────────────────

/// Fixed texts the assistant answers with when no entry applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Replies {
  /// Opening line of a fresh transcript.
  pub greeting:          String,
  /// The knowledge set is empty.
  pub no_knowledge:      String,
  /// Knowledge exists but nothing matched.
  pub unanswered:        String,
  /// Reading the knowledge set failed.
  pub resolution_failed: String,
  /// Answer stored on a provisional log row.
  pub placeholder:       String,
}

impl Default for Replies {
  fn default() -> Self {
    Self {
      greeting:          "Hello! I'm your AI assistant. How can I help you?".into(),
      no_knowledge:      "Sorry, I don't have any information to help with this \
                          right now. Please try again later."
        .into(),
      unanswered:        "I don't have an answer for that yet, but I've noted \
                          your question."
        .into(),
      resolution_failed: "Something went wrong. Please try again later.".into(),
      placeholder:       crate::interaction::DEFAULT_PLACEHOLDER.into(),
    }
  }
}

// ─── Matching ────────────────────────────────────────────────────────────────

/// Outcome of matching a query against candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match<'a> {
  Found(&'a KnowledgeEntry),
  /// There were no candidates at all.
  NoKnowledge,
  /// Candidates existed but none matched.
  Unanswered,
}

/// The first `PREFIX_CHARS` characters of `s`, or all of `s` if shorter.
fn prefix(s: &str) -> &str {
  match s.char_indices().nth(PREFIX_CHARS) {
    Some((idx, _)) => &s[..idx],
    None => s,
  }
}

/// Select the first candidate whose question shares a prefix relationship
/// with `query`.
pub fn find_match<'a>(query: &str, candidates: &'a [KnowledgeEntry]) -> Match<'a> {
  if candidates.is_empty() {
    return Match::NoKnowledge;
  }

  let query = query.to_lowercase();
  let query_prefix = prefix(&query);

  candidates
    .iter()
    .find(|entry| {
      let question = entry.question.to_lowercase();
      question.contains(query_prefix) || query.contains(prefix(&question))
    })
    .map_or(Match::Unanswered, Match::Found)
}

/// Resolve `query` to answer text, falling back to the fixed replies.
pub fn resolve<'a>(
  query: &str,
  candidates: &'a [KnowledgeEntry],
  replies: &'a Replies,
) -> &'a str {
  match find_match(query, candidates) {
    Match::Found(entry) => &entry.answer,
    Match::NoKnowledge => &replies.no_knowledge,
    Match::Unanswered => &replies.unanswered,
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;

  fn entry(question: &str, answer: &str) -> KnowledgeEntry {
    KnowledgeEntry {
      id:         Uuid::new_v4(),
      question:   question.into(),
      answer:     answer.into(),
      tags:       vec![],
      active:     true,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn shared_prefix_matches_both_ways() {
    let candidates = vec![
      entry("Çalışma saatleriniz nedir?", "09:00-18:00"),
      entry("Merhaba nasılsın", "İyiyim, teşekkürler!"),
    ];
    let replies = Replies::default();
    assert_eq!(
      resolve("Merhaba dünya", &candidates, &replies),
      "İyiyim, teşekkürler!"
    );
  }

  #[test]
  fn empty_candidates_always_give_no_knowledge() {
    let replies = Replies::default();
    for query in ["", "x", "Merhaba dünya", "   "] {
      assert_eq!(resolve(query, &[], &replies), replies.no_knowledge);
      assert_eq!(find_match(query, &[]), Match::NoKnowledge);
    }
  }

  #[test]
  fn unrelated_query_is_unanswered() {
    let candidates = vec![entry("Merhaba nasılsın", "iyiyim")];
    let replies = Replies::default();
    assert_eq!(resolve("xyz", &candidates, &replies), replies.unanswered);
  }

  #[test]
  fn matching_ignores_case() {
    let candidates = vec![entry("OPENING HOURS", "Nine to five")];
    assert!(matches!(
      find_match("opening times?", &candidates),
      Match::Found(e) if e.answer == "Nine to five"
    ));
  }

  #[test]
  fn first_match_wins() {
    let candidates = vec![
      entry("pricing for teams", "first"),
      entry("pricing for individuals", "second"),
    ];
    assert!(matches!(
      find_match("pricing?", &candidates),
      Match::Found(e) if e.answer == "first"
    ));
  }

  #[test]
  fn query_contains_question_prefix() {
    // The question lacks the query prefix "could", but the query contains
    // the question prefix "help ".
    let candidates = vec![entry("Help me", "Sure")];
    assert!(matches!(
      find_match("could you help me please", &candidates),
      Match::Found(_)
    ));
  }

  #[test]
  fn short_strings_use_whole_string_as_prefix() {
    let candidates = vec![entry("hi", "hello!")];
    // Query prefix "hi" is contained in the question "hi".
    assert!(matches!(find_match("hi", &candidates), Match::Found(_)));
    // Question prefix "hi" is contained in "this".
    assert!(matches!(find_match("this", &candidates), Match::Found(_)));
    // Neither direction holds.
    assert_eq!(find_match("yo", &candidates), Match::Unanswered);
  }

  #[test]
  fn empty_query_matches_first_candidate() {
    let candidates = vec![entry("anything", "first"), entry("else", "second")];
    assert!(matches!(
      find_match("", &candidates),
      Match::Found(e) if e.answer == "first"
    ));
  }

  #[test]
  fn prefix_respects_character_boundaries() {
    assert_eq!(prefix("ğüşıöç"), "ğüşıö");
    assert_eq!(prefix("abc"), "abc");
    assert_eq!(prefix(""), "");
  }
}
