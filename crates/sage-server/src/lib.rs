//! HTTP server wiring for Sage: configuration and the top-level router.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use sage_api::{AppState, api_router};
use sage_core::{
  auth::DEFAULT_SESSION_TTL_SECS, conversation::ConversationConfig, store::Store,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SAGE__*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  /// Lifetime of an admin session, in seconds.
  pub session_ttl_secs: u32,
  pub conversation:     ConversationConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             "127.0.0.1".to_string(),
      port:             8080,
      store_path:       PathBuf::from("~/.local/share/sage/sage.db"),
      session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
      conversation:     ConversationConfig::default(),
    }
  }
}

impl ServerConfig {
  pub fn session_ttl(&self) -> chrono::Duration {
    chrono::Duration::seconds(i64::from(self.session_ttl_secs))
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application: the JSON API under `/api`, with request
/// tracing.
pub fn build_app<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: Store + 'static,
{
  let state = AppState::new(store, config.conversation.clone(), config.session_ttl());
  Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}
