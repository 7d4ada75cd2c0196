//! SQL schema for the Sage SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Knowledge entries are never deleted; `active = 0` is the soft-delete.
CREATE TABLE IF NOT EXISTS chatbot_knowledge (
    id          TEXT PRIMARY KEY,
    question    TEXT NOT NULL CHECK (question <> ''),
    answer      TEXT NOT NULL CHECK (answer <> ''),
    tags        TEXT NOT NULL DEFAULT '',   -- comma-separated labels
    active      INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL               -- RFC 3339 UTC; store-assigned
);

CREATE TABLE IF NOT EXISTS chatbot_logs (
    id          TEXT PRIMARY KEY,
    question    TEXT NOT NULL,
    answer      TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'pending',   -- 'pending' | 'final'
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS guestbook (
    id          TEXT PRIMARY KEY,
    message     TEXT NOT NULL CHECK (message <> '' AND length(message) <= 500),
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS admins (
    username       TEXT PRIMARY KEY,
    password_hash  TEXT NOT NULL,   -- argon2 PHC string
    created_at     TEXT NOT NULL
);

-- Only the SHA-256 digest of a bearer token is ever stored.
CREATE TABLE IF NOT EXISTS admin_sessions (
    token_hash  TEXT PRIMARY KEY,
    username    TEXT NOT NULL REFERENCES admins(username),
    issued_at   TEXT NOT NULL,
    expires_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS knowledge_active_idx  ON chatbot_knowledge(active);
CREATE INDEX IF NOT EXISTS knowledge_created_idx ON chatbot_knowledge(created_at);
CREATE INDEX IF NOT EXISTS logs_created_idx      ON chatbot_logs(created_at);
CREATE INDEX IF NOT EXISTS guestbook_created_idx ON guestbook(created_at);

PRAGMA user_version = 1;
";
