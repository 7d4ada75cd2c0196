//! JSON REST API for Sage.
//!
//! Exposes an axum [`Router`] backed by any [`sage_core::store::Store`].
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", sage_api::api_router(state))
//! ```

pub mod admin;
pub mod auth;
pub mod chat;
pub mod error;
pub mod extract;
pub mod guestbook;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use chrono::Duration;
use sage_core::{
  auth::Authenticator,
  conversation::{ConversationConfig, ConversationSession},
  curation::AdminCurationService,
  guestbook::GuestbookLedger,
  store::Store,
};

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub conversation: Arc<ConversationSession<S>>,
  pub guestbook:    GuestbookLedger<S>,
  pub curation:     AdminCurationService<S>,
  pub auth:         Authenticator<S>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      conversation: Arc::clone(&self.conversation),
      guestbook:    self.guestbook.clone(),
      curation:     self.curation.clone(),
      auth:         self.auth.clone(),
    }
  }
}

impl<S> AppState<S>
where
  S: Store + 'static,
{
  /// Wire every service to the same `store`.
  pub fn new(store: Arc<S>, conversation: ConversationConfig, session_ttl: Duration) -> Self {
    Self {
      conversation: Arc::new(ConversationSession::new(Arc::clone(&store), conversation)),
      guestbook:    GuestbookLedger::new(Arc::clone(&store)),
      curation:     AdminCurationService::new(Arc::clone(&store)),
      auth:         Authenticator::new(store, session_ttl),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: Store + 'static,
{
  Router::new()
    // Public
    .route("/chat", post(chat::ask::<S>))
    .route("/chat/greeting", get(chat::greeting::<S>))
    .route("/guestbook", get(guestbook::list::<S>).post(guestbook::sign::<S>))
    // Admin
    .route("/admin/login", post(admin::login::<S>))
    .route("/admin/logout", post(admin::logout::<S>))
    .route(
      "/admin/knowledge",
      get(admin::list_knowledge::<S>).post(admin::create_knowledge::<S>),
    )
    .route("/admin/knowledge/{id}/toggle", post(admin::toggle_knowledge::<S>))
    .route("/admin/logs", get(admin::list_logs::<S>))
    .route("/admin/guestbook", get(admin::list_guestbook::<S>))
    .route("/admin/guestbook/{id}", delete(admin::delete_guestbook_entry::<S>))
    .with_state(state)
}
