//! [`SqliteStore`], the SQLite implementation of the `sage-core` storage
//! traits.

use std::path::Path;

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use sage_core::{
  admin::{AdminCredential, SessionRecord},
  guestbook::{GuestbookEntry, NewGuestbookEntry},
  interaction::{InteractionRecord, LogStatus},
  knowledge::{KnowledgeEntry, NewKnowledge, join_tags},
  store::{AdminStore, FinalizeOutcome, GuestbookStore, KnowledgeStore, LogStore},
};

use crate::{
  Error, Result,
  encode::{
    KNOWLEDGE_COLUMNS, LOG_COLUMNS, RawAdmin, RawGuestbook, RawKnowledge, RawLog,
    RawSession, encode_dt, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

/// Current time at the precision the store keeps, so values handed back from
/// inserts compare equal to values read later.
fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

fn sql_limit(limit: usize) -> i64 { i64::try_from(limit).unwrap_or(i64::MAX) }

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Sage store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Knowledge ───────────────────────────────────────────────────────────────

impl KnowledgeStore for SqliteStore {
  type Error = Error;

  async fn create_knowledge(&self, input: NewKnowledge) -> Result<KnowledgeEntry> {
    let entry = KnowledgeEntry {
      id:         Uuid::new_v4(),
      question:   input.question().to_owned(),
      answer:     input.answer().to_owned(),
      tags:       input.tags().to_vec(),
      active:     input.active(),
      created_at: now(),
    };

    let id_str   = encode_uuid(entry.id);
    let question = entry.question.clone();
    let answer   = entry.answer.clone();
    let tags_str = join_tags(&entry.tags);
    let active   = entry.active;
    let at_str   = encode_dt(entry.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO chatbot_knowledge (id, question, answer, tags, active, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, question, answer, tags_str, active, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(entry)
  }

  async fn get_knowledge(&self, id: Uuid) -> Result<Option<KnowledgeEntry>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawKnowledge> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {KNOWLEDGE_COLUMNS} FROM chatbot_knowledge WHERE id = ?1"),
              rusqlite::params![id_str],
              RawKnowledge::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawKnowledge::into_entry).transpose()
  }

  async fn list_active_knowledge(&self) -> Result<Vec<KnowledgeEntry>> {
    let raws: Vec<RawKnowledge> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {KNOWLEDGE_COLUMNS} FROM chatbot_knowledge
           WHERE active = 1
           ORDER BY rowid ASC"
        ))?;
        let rows = stmt
          .query_map([], RawKnowledge::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawKnowledge::into_entry).collect()
  }

  async fn list_knowledge(&self) -> Result<Vec<KnowledgeEntry>> {
    let raws: Vec<RawKnowledge> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {KNOWLEDGE_COLUMNS} FROM chatbot_knowledge
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map([], RawKnowledge::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawKnowledge::into_entry).collect()
  }

  async fn set_knowledge_active(
    &self,
    id: Uuid,
    active: bool,
  ) -> Result<Option<KnowledgeEntry>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawKnowledge> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE chatbot_knowledge SET active = ?2 WHERE id = ?1
                 RETURNING {KNOWLEDGE_COLUMNS}"
              ),
              rusqlite::params![id_str, active],
              RawKnowledge::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawKnowledge::into_entry).transpose()
  }
}

// ─── Interaction logs ────────────────────────────────────────────────────────

impl LogStore for SqliteStore {
  type Error = Error;

  async fn insert_log(
    &self,
    question: String,
    answer: String,
    status: LogStatus,
  ) -> Result<InteractionRecord> {
    let record = InteractionRecord {
      id: Uuid::new_v4(),
      question,
      answer,
      status,
      created_at: now(),
    };

    let id_str     = encode_uuid(record.id);
    let question   = record.question.clone();
    let answer     = record.answer.clone();
    let status_str = encode_status(status);
    let at_str     = encode_dt(record.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO chatbot_logs (id, question, answer, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, question, answer, status_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn finalize_log(&self, id: Uuid, answer: String) -> Result<FinalizeOutcome> {
    let id_str = encode_uuid(id);

    // Both statements run back to back on the connection thread.
    let (updated, exists): (Option<RawLog>, bool) = self
      .conn
      .call(move |conn| {
        let updated = conn
          .query_row(
            &format!(
              "UPDATE chatbot_logs SET answer = ?2, status = 'final'
               WHERE id = ?1 AND status = 'pending'
               RETURNING {LOG_COLUMNS}"
            ),
            rusqlite::params![id_str, answer],
            RawLog::from_row,
          )
          .optional()?;
        if updated.is_some() {
          return Ok((updated, true));
        }

        let exists = conn
          .query_row(
            "SELECT 1 FROM chatbot_logs WHERE id = ?1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        Ok((None, exists))
      })
      .await?;

    Ok(match (updated, exists) {
      (Some(raw), _) => FinalizeOutcome::Finalized(raw.into_record()?),
      (None, true) => FinalizeOutcome::AlreadyFinal,
      (None, false) => FinalizeOutcome::NotFound,
    })
  }

  async fn recent_logs(&self, limit: usize) -> Result<Vec<InteractionRecord>> {
    let limit_val = sql_limit(limit);

    let raws: Vec<RawLog> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {LOG_COLUMNS} FROM chatbot_logs
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], RawLog::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLog::into_record).collect()
  }
}

// ─── Guestbook ───────────────────────────────────────────────────────────────

impl GuestbookStore for SqliteStore {
  type Error = Error;

  async fn add_guestbook_entry(&self, input: NewGuestbookEntry) -> Result<GuestbookEntry> {
    let entry = GuestbookEntry {
      id:         Uuid::new_v4(),
      message:    input.message().to_owned(),
      created_at: now(),
    };

    let id_str  = encode_uuid(entry.id);
    let message = entry.message.clone();
    let at_str  = encode_dt(entry.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO guestbook (id, message, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, message, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(entry)
  }

  async fn list_guestbook(&self) -> Result<Vec<GuestbookEntry>> {
    let raws: Vec<RawGuestbook> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, message, created_at FROM guestbook
           ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt
          .query_map([], RawGuestbook::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGuestbook::into_entry).collect()
  }

  async fn delete_guestbook_entry(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM guestbook WHERE id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    Ok(deleted > 0)
  }
}

// ─── Admins ──────────────────────────────────────────────────────────────────

impl AdminStore for SqliteStore {
  type Error = Error;

  async fn add_admin(&self, username: String, password_hash: String) -> Result<AdminCredential> {
    let credential = AdminCredential { username, password_hash, created_at: now() };

    let username = credential.username.clone();
    let hash     = credential.password_hash.clone();
    let at_str   = encode_dt(credential.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO admins (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![username, hash, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(credential)
  }

  async fn find_admin(&self, username: String) -> Result<Option<AdminCredential>> {
    let raw: Option<RawAdmin> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT username, password_hash, created_at FROM admins WHERE username = ?1",
              rusqlite::params![username],
              |row| {
                Ok(RawAdmin {
                  username:      row.get(0)?,
                  password_hash: row.get(1)?,
                  created_at:    row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAdmin::into_credential).transpose()
  }

  async fn insert_session(&self, session: SessionRecord) -> Result<()> {
    let issued_str  = encode_dt(session.issued_at);
    let expires_str = encode_dt(session.expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO admin_sessions (token_hash, username, issued_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![session.token_hash, session.username, issued_str, expires_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find_session(&self, token_hash: String) -> Result<Option<SessionRecord>> {
    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT token_hash, username, issued_at, expires_at
               FROM admin_sessions WHERE token_hash = ?1",
              rusqlite::params![token_hash],
              |row| {
                Ok(RawSession {
                  token_hash: row.get(0)?,
                  username:   row.get(1)?,
                  issued_at:  row.get(2)?,
                  expires_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSession::into_record).transpose()
  }

  async fn delete_session(&self, token_hash: String) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM admin_sessions WHERE token_hash = ?1",
          rusqlite::params![token_hash],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
    let now_str = encode_dt(now);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM admin_sessions WHERE expires_at <= ?1",
          rusqlite::params![now_str],
        )?)
      })
      .await?;

    Ok(deleted)
  }
}
