//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexical order equals chronological order.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use sage_core::{
  admin::{AdminCredential, SessionRecord},
  guestbook::GuestbookEntry,
  interaction::{InteractionRecord, LogStatus},
  knowledge::{KnowledgeEntry, parse_tags},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── LogStatus ───────────────────────────────────────────────────────────────

pub fn encode_status(s: LogStatus) -> &'static str {
  match s {
    LogStatus::Pending => "pending",
    LogStatus::Final => "final",
  }
}

pub fn decode_status(s: &str) -> Result<LogStatus> {
  match s {
    "pending" => Ok(LogStatus::Pending),
    "final" => Ok(LogStatus::Final),
    other => Err(Error::UnknownStatus(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawKnowledge::from_row`].
pub const KNOWLEDGE_COLUMNS: &str = "id, question, answer, tags, active, created_at";

/// Raw values read directly from a `chatbot_knowledge` row.
pub struct RawKnowledge {
  pub id:         String,
  pub question:   String,
  pub answer:     String,
  pub tags:       String,
  pub active:     bool,
  pub created_at: String,
}

impl RawKnowledge {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      question:   row.get(1)?,
      answer:     row.get(2)?,
      tags:       row.get(3)?,
      active:     row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_entry(self) -> Result<KnowledgeEntry> {
    Ok(KnowledgeEntry {
      id:         decode_uuid(&self.id)?,
      question:   self.question,
      answer:     self.answer,
      tags:       parse_tags(&self.tags),
      active:     self.active,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawLog::from_row`].
pub const LOG_COLUMNS: &str = "id, question, answer, status, created_at";

/// Raw values read directly from a `chatbot_logs` row.
pub struct RawLog {
  pub id:         String,
  pub question:   String,
  pub answer:     String,
  pub status:     String,
  pub created_at: String,
}

impl RawLog {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      question:   row.get(1)?,
      answer:     row.get(2)?,
      status:     row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_record(self) -> Result<InteractionRecord> {
    Ok(InteractionRecord {
      id:         decode_uuid(&self.id)?,
      question:   self.question,
      answer:     self.answer,
      status:     decode_status(&self.status)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `guestbook` row.
pub struct RawGuestbook {
  pub id:         String,
  pub message:    String,
  pub created_at: String,
}

impl RawGuestbook {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { id: row.get(0)?, message: row.get(1)?, created_at: row.get(2)? })
  }

  pub fn into_entry(self) -> Result<GuestbookEntry> {
    Ok(GuestbookEntry {
      id:         decode_uuid(&self.id)?,
      message:    self.message,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from an `admins` row.
pub struct RawAdmin {
  pub username:      String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawAdmin {
  pub fn into_credential(self) -> Result<AdminCredential> {
    Ok(AdminCredential {
      username:      self.username,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from an `admin_sessions` row.
pub struct RawSession {
  pub token_hash: String,
  pub username:   String,
  pub issued_at:  String,
  pub expires_at: String,
}

impl RawSession {
  pub fn into_record(self) -> Result<SessionRecord> {
    Ok(SessionRecord {
      token_hash: self.token_hash,
      username:   self.username,
      issued_at:  decode_dt(&self.issued_at)?,
      expires_at: decode_dt(&self.expires_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width_and_sortable() {
    let whole = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let later = whole + chrono::Duration::microseconds(1500);
    let (a, b) = (encode_dt(whole), encode_dt(later));
    assert_eq!(a.len(), b.len());
    assert!(a < b);
    assert_eq!(decode_dt(&b).unwrap(), later);
  }

  #[test]
  fn status_roundtrip_and_unknown() {
    for s in [LogStatus::Pending, LogStatus::Final] {
      assert_eq!(decode_status(encode_status(s)).unwrap(), s);
    }
    assert!(matches!(decode_status("done"), Err(Error::UnknownStatus(_))));
  }
}
