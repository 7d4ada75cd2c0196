//! One chat turn, from the visitor's query to the logged answer.
//!
//! Each call to [`ConversationSession::submit`] runs a fresh turn through
//! `Idle -> AwaitingLog -> Resolving -> Answered`. The provisional log write,
//! the knowledge lookup and the final log write happen strictly in that
//! order. Storage failures along the way degrade the turn (a missing log row,
//! a fallback answer) but never fail it.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  interaction::{InteractionLogger, LogPolicy},
  matcher::{self, Replies},
  store::{KnowledgeStore, LogStore},
};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
  /// Fixed part of the artificial "typing" delay before answering.
  pub reply_delay_min_ms:    u64,
  /// Upper bound of the random part added to `reply_delay_min_ms`.
  pub reply_delay_jitter_ms: u64,
  pub log_policy:            LogPolicy,
  pub replies:               Replies,
}

impl Default for ConversationConfig {
  fn default() -> Self {
    Self {
      reply_delay_min_ms:    1000,
      reply_delay_jitter_ms: 2000,
      log_policy:            LogPolicy::default(),
      replies:               Replies::default(),
    }
  }
}

impl ConversationConfig {
  /// Defaults with the reply delay disabled.
  pub fn immediate() -> Self {
    Self { reply_delay_min_ms: 0, reply_delay_jitter_ms: 0, ..Self::default() }
  }

  fn reply_delay(&self) -> Duration {
    let jitter = match self.reply_delay_jitter_ms {
      0 => 0,
      max => OsRng.next_u64() % max,
    };
    Duration::from_millis(self.reply_delay_min_ms.saturating_add(jitter))
  }
}

// ─── State machine ───────────────────────────────────────────────────────────

/// Progress of a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
  Idle,
  AwaitingLog,
  Resolving,
  Answered,
}

impl TurnState {
  fn successor(self) -> Option<Self> {
    match self {
      Self::Idle => Some(Self::AwaitingLog),
      Self::AwaitingLog => Some(Self::Resolving),
      Self::Resolving => Some(Self::Answered),
      Self::Answered => None,
    }
  }
}

#[derive(Debug)]
struct TurnMachine {
  id:    Uuid,
  state: TurnState,
}

impl TurnMachine {
  fn new() -> Self { Self { id: Uuid::new_v4(), state: TurnState::Idle } }

  fn advance(&mut self, to: TurnState) -> Result<()> {
    if self.state.successor() != Some(to) {
      return Err(Error::InvalidTransition { from: self.state, to });
    }
    tracing::debug!(turn = %self.id, from = ?self.state, ?to, "turn transition");
    self.state = to;
    Ok(())
  }
}

/// The result of a completed turn.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
  pub question:    String,
  pub answer:      String,
  pub answered_at: DateTime<Utc>,
  /// Always [`TurnState::Answered`] for a returned turn.
  pub state:       TurnState,
}

// ─── Transcript ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
  Bot,
  Visitor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
  pub id:        Uuid,
  pub text:      String,
  pub author:    Author,
  pub timestamp: DateTime<Utc>,
}

/// The message history a caller chooses to keep. The engine holds none.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
  messages: Vec<ChatMessage>,
}

impl Transcript {
  /// A transcript opening with the bot's greeting.
  pub fn new(greeting: &str) -> Self {
    let mut transcript = Self::default();
    transcript.push(Author::Bot, greeting.to_owned(), Utc::now());
    transcript
  }

  pub fn messages(&self) -> &[ChatMessage] { &self.messages }

  fn push(&mut self, author: Author, text: String, timestamp: DateTime<Utc>) {
    self.messages.push(ChatMessage { id: Uuid::new_v4(), text, author, timestamp });
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

pub struct ConversationSession<S> {
  store:  Arc<S>,
  logger: InteractionLogger<S>,
  config: ConversationConfig,
}

impl<S> ConversationSession<S>
where
  S: KnowledgeStore + LogStore + 'static,
{
  pub fn new(store: Arc<S>, config: ConversationConfig) -> Self {
    let logger = InteractionLogger::new(
      Arc::clone(&store),
      config.log_policy,
      config.replies.placeholder.clone(),
    );
    Self { store, logger, config }
  }

  pub fn replies(&self) -> &Replies { &self.config.replies }

  /// A fresh transcript opening with the configured greeting.
  pub fn transcript(&self) -> Transcript { Transcript::new(&self.config.replies.greeting) }

  /// Run one turn for `query`.
  ///
  /// Blank input is rejected before anything is written.
  pub async fn submit(&self, query: &str) -> Result<Turn> {
    let question = query.trim();
    if question.is_empty() {
      return Err(Error::validation("message must not be empty"));
    }

    let mut machine = TurnMachine::new();
    machine.advance(TurnState::AwaitingLog)?;

    let handle = match self.logger.record_provisional(question).await {
      Ok(handle) => Some(handle),
      Err(e) => {
        tracing::warn!(turn = %machine.id, error = %e, "provisional log write failed");
        None
      }
    };
    machine.advance(TurnState::Resolving)?;

    let delay = self.config.reply_delay();
    if !delay.is_zero() {
      tokio::time::sleep(delay).await;
    }

    let answer = match self.store.list_active_knowledge().await {
      Ok(candidates) => {
        matcher::resolve(question, &candidates, &self.config.replies).to_owned()
      }
      Err(e) => {
        tracing::error!(turn = %machine.id, error = %e, "knowledge lookup failed");
        self.config.replies.resolution_failed.clone()
      }
    };
    machine.advance(TurnState::Answered)?;
    let answered_at = Utc::now();

    // The final write runs on its own task so it still lands if the caller
    // drops this future.
    let logger = self.logger.clone();
    let (q, a) = (question.to_owned(), answer.clone());
    let finalize =
      tokio::spawn(async move { logger.record_final(handle, &q, &a).await });
    match finalize.await {
      Ok(Ok(_)) => {}
      Ok(Err(e)) => {
        tracing::warn!(turn = %machine.id, error = %e, "final log write failed");
      }
      Err(e) => {
        tracing::warn!(turn = %machine.id, error = %e, "final log task aborted");
      }
    }

    Ok(Turn {
      question: question.to_owned(),
      answer,
      answered_at,
      state: machine.state,
    })
  }

  /// Run a turn and record both sides of it in `transcript`.
  ///
  /// Nothing is appended if the query is rejected.
  pub async fn converse(&self, transcript: &mut Transcript, query: &str) -> Result<Turn> {
    let asked_at = Utc::now();
    let turn = self.submit(query).await?;
    transcript.push(Author::Visitor, turn.question.clone(), asked_at);
    transcript.push(Author::Bot, turn.answer.clone(), turn.answered_at);
    Ok(turn)
  }
}
