//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Body of every 500 response. Backend details only go to the log.
pub const INTERNAL_MESSAGE: &str = "something went wrong, please try again later";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("invalid username or password")]
  LoginFailed,

  #[error("unauthorized")]
  Unauthorized,

  #[error("internal error: {0}")]
  Internal(#[source] sage_core::Error),
}

impl From<sage_core::Error> for ApiError {
  fn from(e: sage_core::Error) -> Self {
    use sage_core::Error as E;
    match e {
      E::Validation(msg) => ApiError::BadRequest(msg),
      E::KnowledgeNotFound(_) | E::GuestbookEntryNotFound(_) | E::LogNotFound(_) => {
        ApiError::NotFound(e.to_string())
      }
      E::LoginFailed => ApiError::LoginFailed,
      E::Unauthorized => ApiError::Unauthorized,
      other => ApiError::Internal(other),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::LoginFailed => (StatusCode::UNAUTHORIZED, self.to_string()),
      ApiError::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorized" }))).into_response();
        res
          .headers_mut()
          .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        return res;
      }
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  #[test]
  fn core_errors_map_to_status_codes() {
    let cases = [
      (sage_core::Error::validation("x"), StatusCode::BAD_REQUEST),
      (sage_core::Error::KnowledgeNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
      (sage_core::Error::GuestbookEntryNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
      (sage_core::Error::LoginFailed, StatusCode::UNAUTHORIZED),
      (sage_core::Error::Unauthorized, StatusCode::UNAUTHORIZED),
      (sage_core::Error::LogAlreadyFinal(Uuid::nil()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, status) in cases {
      assert_eq!(ApiError::from(err).into_response().status(), status);
    }
  }

  #[tokio::test]
  async fn store_failures_hide_details() {
    let backend = std::io::Error::other("disk I/O error at /var/lib/sage.db");
    let res = ApiError::from(sage_core::Error::store(backend)).into_response();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "error": INTERNAL_MESSAGE }));
  }

  #[test]
  fn unauthorized_carries_bearer_challenge() {
    let res = ApiError::Unauthorized.into_response();
    assert_eq!(res.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
  }
}
