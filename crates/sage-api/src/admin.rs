//! Handlers for `/admin` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/admin/login` | Body: `{"username":"..","password":".."}` |
//! | `POST`   | `/admin/logout` | Revokes the bearer token |
//! | `GET`    | `/admin/knowledge` | All entries, newest first |
//! | `POST`   | `/admin/knowledge` | Body: `{"question","answer","tags"?,"active"?}` |
//! | `POST`   | `/admin/knowledge/:id/toggle` | 404 if not found |
//! | `GET`    | `/admin/logs` | Optional `?limit=` |
//! | `GET`    | `/admin/guestbook` | |
//! | `DELETE` | `/admin/guestbook/:id` | 404 if not found |
//!
//! Everything except `login` requires `Authorization: Bearer <token>`.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use sage_core::{
  admin::LoginGrant,
  guestbook::GuestbookEntry,
  interaction::InteractionRecord,
  knowledge::{KnowledgeEntry, NewKnowledge, parse_tags},
  store::Store,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  auth::Admin,
  error::ApiError,
  extract::{JsonBody, PathParam, QueryParams},
};

// ─── Session ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

/// `POST /admin/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<LoginBody>,
) -> Result<Json<LoginGrant>, ApiError>
where
  S: Store + 'static,
{
  let grant = state.auth.login(&body.username, &body.password).await?;
  Ok(Json(grant))
}

/// `POST /admin/logout`
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  Admin(session): Admin,
) -> Result<StatusCode, ApiError>
where
  S: Store + 'static,
{
  state.auth.logout(&session).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Knowledge ───────────────────────────────────────────────────────────────

/// `GET /admin/knowledge`
pub async fn list_knowledge<S>(
  State(state): State<AppState<S>>,
  Admin(session): Admin,
) -> Result<Json<Vec<KnowledgeEntry>>, ApiError>
where
  S: Store + 'static,
{
  Ok(Json(state.curation.list_knowledge(&session).await?))
}

#[derive(Debug, Deserialize)]
pub struct KnowledgeBody {
  pub question: String,
  pub answer:   String,
  /// Comma-separated labels, e.g. `"selam, giriş"`.
  #[serde(default)]
  pub tags:     Option<String>,
  #[serde(default)]
  pub active:   Option<bool>,
}

/// `POST /admin/knowledge`
pub async fn create_knowledge<S>(
  State(state): State<AppState<S>>,
  Admin(session): Admin,
  JsonBody(body): JsonBody<KnowledgeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Store + 'static,
{
  let tags = body.tags.as_deref().map(parse_tags).unwrap_or_default();
  let input = NewKnowledge::new(&body.question, &body.answer, tags, body.active.unwrap_or(true))?;
  let entry = state.curation.add_knowledge(&session, input).await?;
  Ok((StatusCode::CREATED, Json(entry)))
}

/// `POST /admin/knowledge/:id/toggle`
pub async fn toggle_knowledge<S>(
  State(state): State<AppState<S>>,
  Admin(session): Admin,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<KnowledgeEntry>, ApiError>
where
  S: Store + 'static,
{
  Ok(Json(state.curation.toggle_knowledge(&session, id).await?))
}

// ─── Logs ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LogParams {
  pub limit: Option<usize>,
}

/// `GET /admin/logs[?limit=<n>]`
pub async fn list_logs<S>(
  State(state): State<AppState<S>>,
  Admin(session): Admin,
  QueryParams(params): QueryParams<LogParams>,
) -> Result<Json<Vec<InteractionRecord>>, ApiError>
where
  S: Store + 'static,
{
  Ok(Json(state.curation.list_logs(&session, params.limit).await?))
}

// ─── Guestbook moderation ────────────────────────────────────────────────────

/// `GET /admin/guestbook`
pub async fn list_guestbook<S>(
  State(state): State<AppState<S>>,
  Admin(session): Admin,
) -> Result<Json<Vec<GuestbookEntry>>, ApiError>
where
  S: Store + 'static,
{
  Ok(Json(state.curation.list_guestbook(&session).await?))
}

/// `DELETE /admin/guestbook/:id`
pub async fn delete_guestbook_entry<S>(
  State(state): State<AppState<S>>,
  Admin(session): Admin,
  PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: Store + 'static,
{
  state.curation.delete_guestbook_entry(&session, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
