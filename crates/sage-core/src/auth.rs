//! The authorization gate in front of every administrative operation.
//!
//! Credentials are verified against argon2 PHC hashes. A successful login
//! issues a random bearer token; the store keeps only its SHA-256 digest and
//! an expiry.

use std::sync::{Arc, LazyLock};

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use chrono::{DateTime, Duration, Utc};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::{
  Error, Result,
  admin::{AdminCredential, AdminSession, LoginGrant, SessionRecord},
  store::AdminStore,
};

/// Random bytes per bearer token (hex-encoded on the wire).
pub const TOKEN_BYTES: usize = 32;

/// Default lifetime of an admin session: twelve hours.
pub const DEFAULT_SESSION_TTL_SECS: u32 = 12 * 60 * 60;

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Produce an argon2 PHC string for `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

/// `true` if `password` matches the PHC string. Malformed hashes never match.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
  PasswordHash::new(password_hash)
    .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
    .is_ok()
}

/// Verified against when the username is unknown, so both login failures
/// pay for one argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
  LazyLock::new(|| hash_password("sage-dummy-password").ok());

fn new_token() -> String {
  let mut bytes = [0u8; TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

fn token_digest(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

// ─── Authenticator ───────────────────────────────────────────────────────────

pub struct Authenticator<A> {
  store:       Arc<A>,
  session_ttl: Duration,
}

impl<A> Clone for Authenticator<A> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), session_ttl: self.session_ttl }
  }
}

impl<A: AdminStore> Authenticator<A> {
  pub fn new(store: Arc<A>, session_ttl: Duration) -> Self {
    LazyLock::force(&DUMMY_HASH);
    Self { store, session_ttl }
  }

  /// Store a new administrator credential.
  pub async fn register(&self, username: &str, password: &str) -> Result<AdminCredential> {
    let username = username.trim();
    if username.is_empty() || password.trim().is_empty() {
      return Err(Error::validation("username and password are required"));
    }

    let existing = self
      .store
      .find_admin(username.to_owned())
      .await
      .map_err(Error::store)?;
    if existing.is_some() {
      return Err(Error::validation(format!("admin {username:?} already exists")));
    }

    let password_hash = hash_password(password)?;
    let credential = self
      .store
      .add_admin(username.to_owned(), password_hash)
      .await
      .map_err(Error::store)?;
    tracing::info!(username, "admin registered");
    Ok(credential)
  }

  /// Verify a username/password pair and open a session.
  ///
  /// An unknown username and a wrong password fail identically.
  pub async fn login(&self, username: &str, password: &str) -> Result<LoginGrant> {
    let username = username.trim();
    if username.is_empty() || password.trim().is_empty() {
      return Err(Error::validation("username and password are required"));
    }

    let credential = self
      .store
      .find_admin(username.to_owned())
      .await
      .map_err(Error::store)?;

    let credential = match credential {
      Some(c) if verify_password(password, &c.password_hash) => c,
      Some(_) => {
        tracing::info!(username, "admin login rejected");
        return Err(Error::LoginFailed);
      }
      None => {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
          verify_password(password, dummy);
        }
        tracing::info!(username, "admin login rejected");
        return Err(Error::LoginFailed);
      }
    };

    let token = new_token();
    let issued_at = Utc::now();
    let record = SessionRecord {
      token_hash: token_digest(&token),
      username: credential.username,
      issued_at,
      expires_at: issued_at
        .checked_add_signed(self.session_ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC),
    };

    let purged = self
      .store
      .delete_expired_sessions(issued_at)
      .await
      .map_err(Error::store)?;
    if purged > 0 {
      tracing::debug!(purged, "expired admin sessions removed");
    }

    self
      .store
      .insert_session(record.clone())
      .await
      .map_err(Error::store)?;
    tracing::info!(username = %record.username, expires_at = %record.expires_at, "admin logged in");

    Ok(LoginGrant {
      username: record.username.clone(),
      token,
      expires_at: record.expires_at,
      session: AdminSession::from_record(record),
    })
  }

  /// Resolve a bearer token to a live session. Expired sessions are removed.
  pub async fn authenticate(&self, token: &str) -> Result<AdminSession> {
    let token = token.trim();
    if token.is_empty() {
      return Err(Error::Unauthorized);
    }

    let token_hash = token_digest(token);
    let record = self
      .store
      .find_session(token_hash.clone())
      .await
      .map_err(Error::store)?
      .ok_or(Error::Unauthorized)?;

    if Utc::now() >= record.expires_at {
      self
        .store
        .delete_session(token_hash)
        .await
        .map_err(Error::store)?;
      tracing::debug!(username = %record.username, "expired admin session removed");
      return Err(Error::Unauthorized);
    }

    Ok(AdminSession::from_record(record))
  }

  /// Revoke the session.
  pub async fn logout(&self, session: &AdminSession) -> Result<()> {
    self
      .store
      .delete_session(session.token_hash().to_owned())
      .await
      .map_err(Error::store)?;
    tracing::info!(username = session.username(), "admin logged out");
    Ok(())
  }
}
