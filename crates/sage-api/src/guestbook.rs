//! Handlers for the public `/guestbook` endpoints.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sage_core::{guestbook::GuestbookEntry, store::Store};
use serde::Deserialize;

use crate::{AppState, error::ApiError, extract::JsonBody};

/// `GET /guestbook`, newest first.
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<GuestbookEntry>>, ApiError>
where
  S: Store + 'static,
{
  Ok(Json(state.guestbook.list().await?))
}

#[derive(Debug, Deserialize)]
pub struct SignBody {
  pub message: String,
}

/// `POST /guestbook` with body: `{"message":"..."}`
pub async fn sign<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<SignBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Store + 'static,
{
  let entry = state.guestbook.add(&body.message).await?;
  Ok((StatusCode::CREATED, Json(entry)))
}
