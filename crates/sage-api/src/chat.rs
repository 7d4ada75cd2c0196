//! Handlers for `/chat` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/chat/greeting` | Opening line of a new conversation |
//! | `POST` | `/chat` | Body: `{"message":"..."}` |

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use sage_core::store::Store;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError, extract::JsonBody};

// ─── Greeting ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Greeting {
  pub text: String,
}

/// `GET /chat/greeting`
pub async fn greeting<S>(State(state): State<AppState<S>>) -> Json<Greeting>
where
  S: Store + 'static,
{
  Json(Greeting { text: state.conversation.replies().greeting.clone() })
}

// ─── Ask ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AskBody {
  pub message: String,
}

#[derive(Debug, Serialize)]
pub struct Reply {
  pub question:    String,
  pub answer:      String,
  pub answered_at: DateTime<Utc>,
}

/// `POST /chat`: runs one turn, including the reply delay.
pub async fn ask<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<AskBody>,
) -> Result<Json<Reply>, ApiError>
where
  S: Store + 'static,
{
  let turn = state.conversation.submit(&body.message).await?;
  Ok(Json(Reply {
    question:    turn.question,
    answer:      turn.answer,
    answered_at: turn.answered_at,
  }))
}
